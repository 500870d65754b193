//! Conversions between the wire, cache and domain shapes of a video.
//!
//! All three carry the same five fields; the conversions copy them across
//! unchanged and never fail. Sequence conversions keep the input order.

use crate::domain::DevByteVideo;
use devbytes_cache::VideoRecord;
use devbytes_network::NetworkVideo;

pub fn descriptor_to_record(video: NetworkVideo) -> VideoRecord {
    VideoRecord {
        url: video.url,
        title: video.title,
        description: video.description,
        updated: video.updated,
        thumbnail: video.thumbnail,
    }
}

pub fn record_to_domain(record: &VideoRecord) -> DevByteVideo {
    DevByteVideo {
        url: record.url.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        updated: record.updated.clone(),
        thumbnail: record.thumbnail.clone(),
    }
}

pub fn descriptors_to_records(videos: impl IntoIterator<Item = NetworkVideo>) -> Vec<VideoRecord> {
    videos.into_iter().map(descriptor_to_record).collect()
}

pub fn records_to_domain<'a>(records: impl IntoIterator<Item = &'a VideoRecord>) -> Vec<DevByteVideo> {
    records.into_iter().map(record_to_domain).collect()
}

impl From<&VideoRecord> for DevByteVideo {
    fn from(record: &VideoRecord) -> Self {
        record_to_domain(record)
    }
}
