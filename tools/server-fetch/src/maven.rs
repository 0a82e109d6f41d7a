//! Minimal `maven-metadata.xml` reading
//!
//! Only the `<versioning><snapshot>` block of a snapshot version directory
//! is needed, so this scans for the two tags instead of parsing XML.

use crate::coordinates::SnapshotBuild;

/// Text content of the first `<tag>...</tag>` in `xml`, trimmed
fn tag_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let end = start + xml[start..].find(&close)?;
    Some(xml[start..end].trim())
}

/// Latest timestamped build listed in snapshot metadata
pub fn parse_snapshot_metadata(xml: &str) -> Option<SnapshotBuild> {
    let snapshot = tag_text(xml, "snapshot")?;
    let timestamp = tag_text(snapshot, "timestamp").filter(|t| !t.is_empty())?;
    let build_number = tag_text(snapshot, "buildNumber").filter(|b| !b.is_empty())?;
    Some(SnapshotBuild {
        timestamp: timestamp.to_string(),
        build_number: build_number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata modelVersion="1.1.0">
  <groupId>org.eclipse.glsp.example</groupId>
  <artifactId>org.eclipse.glsp.example.workflow</artifactId>
  <version>1.0.0-SNAPSHOT</version>
  <versioning>
    <snapshot>
      <timestamp>20220314.101500</timestamp>
      <buildNumber>7</buildNumber>
    </snapshot>
    <lastUpdated>20220314101500</lastUpdated>
  </versioning>
</metadata>"#;

    #[test]
    fn reads_timestamp_and_build_number() {
        let build = parse_snapshot_metadata(METADATA).unwrap();
        assert_eq!(build.timestamp, "20220314.101500");
        assert_eq!(build.build_number, "7");
    }

    #[test]
    fn local_copy_metadata_has_no_build() {
        let xml = "<metadata><versioning><snapshot><localCopy>true</localCopy></snapshot></versioning></metadata>";
        assert_eq!(parse_snapshot_metadata(xml), None);
    }

    #[test]
    fn release_metadata_has_no_build() {
        let xml = "<metadata><versioning><release>1.0.0</release></versioning></metadata>";
        assert_eq!(parse_snapshot_metadata(xml), None);
    }

    #[test]
    fn ignores_timestamp_outside_snapshot_block() {
        let xml = "<metadata><timestamp>1</timestamp><versioning><snapshot></snapshot></versioning></metadata>";
        assert_eq!(parse_snapshot_metadata(xml), None);
    }
}
