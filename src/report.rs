use anyhow::Result;
use serde::Serialize;

use audiofile::process::reader::FileInfo;
use audiofile::structs::descriptor::AudioStreamDescriptor;
use audiofile::structs::id3::Id3Header;

use crate::timestamp::time_str_millis;

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub input: String,
    pub kind: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id3: Option<Id3Report>,
}

#[derive(Debug, Serialize)]
pub struct StreamReport {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub bytes_per_frame: u16,
    pub avg_bytes_per_second: u32,
    pub data_length: u64,
    pub frame_count: u64,
    pub duration_ms: u64,
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct Id3Report {
    pub version: String,
    pub flags: u8,
    pub tag_size: u32,
    pub first_frame: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_frame_text: String,
}

impl FileReport {
    pub fn new(input: String, info: &FileInfo) -> Self {
        Self {
            input,
            kind: info.kind.to_string(),
            size_bytes: info.file_size,
            stream: info.descriptor.as_ref().map(StreamReport::from),
            id3: info.id3.as_ref().map(Id3Report::from),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

impl From<&AudioStreamDescriptor> for StreamReport {
    fn from(desc: &AudioStreamDescriptor) -> Self {
        let duration_ms = desc.duration_millis();
        Self {
            format_tag: desc.format_tag,
            channels: desc.channel_count,
            sample_rate: desc.sample_rate,
            bits_per_sample: desc.bits_per_sample,
            bytes_per_frame: desc.bytes_per_frame,
            avg_bytes_per_second: desc.avg_bytes_per_second,
            data_length: desc.data_length,
            frame_count: desc.frame_count(),
            duration_ms,
            duration: time_str_millis(duration_ms),
        }
    }
}

impl From<&Id3Header> for Id3Report {
    fn from(header: &Id3Header) -> Self {
        let first_frame_text = if header.first_frame.is_text_frame() {
            header.first_frame.text()
        } else {
            String::new()
        };

        Self {
            version: format!("2.{}.{}", header.version, header.revision),
            flags: header.flags,
            tag_size: header.tag_size,
            first_frame: header.first_frame.id_str(),
            first_frame_text,
        }
    }
}
