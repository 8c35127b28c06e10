//! Runs the ETL steps end to end over the fixture map.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use osm_wrangle::config::{create_output_dir, UserConfig};
use osm_wrangle::data::{Address, Document, ElementKind};
use osm_wrangle::etl::audit_osm::{AuditOsmEtl, AuditReport};
use osm_wrangle::etl::parse_osm::open_osm;
use osm_wrangle::etl::shape_osm::{ShapeOsmEtl, OUTPUT_FILE_NAME};
use osm_wrangle::etl::Etl;
use osm_wrangle::transform;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("example.osm")
}

fn test_config(data_path: &Path, dest: &TempDir) -> UserConfig {
    let mut config = UserConfig::new(&data_path.to_string_lossy());
    config.dest_path = dest.path().to_string_lossy().into_owned();
    config.progress = false;
    config
}

fn read_json_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn shapes_fixture_into_json_lines() {
    let dest = tempfile::tempdir().unwrap();
    let config = test_config(&fixture_path(), &dest);
    let output_dir = create_output_dir(&config).unwrap();

    ShapeOsmEtl::new(&config).process(&output_dir).unwrap();

    let docs = read_json_lines(&output_dir.join(OUTPUT_FILE_NAME));
    let ids: Vec<&str> = docs.iter().map(|doc| doc["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["261114295", "261114296", "757860928", "1683602133", "209809850"]);

    assert_eq!(
        docs[0],
        json!({
            "id": "261114295",
            "visible": "true",
            "type": "node",
            "pos": [41.9730791, -87.6866303],
            "created": {
                "changeset": "11129782",
                "user": "bbmiller",
                "version": "7",
                "uid": "451048",
                "timestamp": "2012-03-28T18:31:23Z"
            }
        })
    );

    assert_eq!(docs[3]["address"], json!({"housenumber": "5157", "postcode": "60625", "street": "North Lincoln Avenue"}));
    assert_eq!(docs[3]["phone"], "1 (773)-271-5176");

    let way = &docs[4];
    assert_eq!(way["type"], "way");
    assert!(way.get("pos").is_none());
    assert_eq!(way["address"], json!({"street": "West Lexington Street", "housenumber": "1412"}));
    assert_eq!(
        way["node_refs"],
        json!(["2199822281", "2199822390", "2199822392", "2199822369", "2199822370", "2199822284", "2199822281"])
    );
    assert_eq!(way["chicago:building_id"], "366409");
}

#[test]
fn counts_every_outcome() {
    let dest = tempfile::tempdir().unwrap();
    let config = test_config(&fixture_path(), &dest);
    let mut etl = ShapeOsmEtl::new(&config);

    let input = etl.extract(dest.path()).unwrap();
    let mut output = etl.transform(input).unwrap();
    let documents: Vec<Document> = output.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(documents.len(), 5);
    let stats = output.stats();
    assert_eq!(stats.nodes, 4);
    assert_eq!(stats.ways, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.rejected.get("invalid_postcode"), Some(&1));
    assert_eq!(stats.rejected.get("nested_address"), Some(&1));
    assert_eq!(stats.rejected_total(), 2);
}

#[test]
fn accepted_documents_respect_field_vocabularies() {
    for element in open_osm(&fixture_path()).unwrap() {
        let Some(doc) = transform(&element.unwrap()).unwrap() else {
            continue;
        };
        let value = serde_json::to_value(&doc).unwrap();
        let created = value["created"].as_object().unwrap();
        assert!(created
            .keys()
            .all(|key| ["version", "changeset", "timestamp", "user", "uid"].contains(&key.as_str())));
        if let Some(address) = value.get("address") {
            assert!(address
                .as_object()
                .unwrap()
                .keys()
                .all(|key| ["street", "housenumber", "postcode"].contains(&key.as_str())));
        }
        assert!(matches!(doc.kind, ElementKind::Node | ElementKind::Way));
    }
}

#[test]
fn json_array_output_reads_back() {
    let dest = tempfile::tempdir().unwrap();
    let mut config = test_config(&fixture_path(), &dest);
    config.json_array = true;
    config.pretty = true;
    let output_dir = create_output_dir(&config).unwrap();

    ShapeOsmEtl::new(&config).process(&output_dir).unwrap();

    let text = fs::read_to_string(output_dir.join(OUTPUT_FILE_NAME)).unwrap();
    let docs: Vec<Document> = serde_json::from_str(&text).unwrap();
    assert_eq!(docs.len(), 5);
    assert_eq!(
        docs[4].address,
        Some(Address {
            street: Some("West Lexington Street".to_string()),
            housenumber: Some("1412".to_string()),
            postcode: None,
        })
    );
}

#[test]
fn cached_output_is_not_rebuilt_until_cleaned() {
    let dest = tempfile::tempdir().unwrap();
    let config = test_config(&fixture_path(), &dest);
    let output_dir = create_output_dir(&config).unwrap();
    let output_path = output_dir.join(OUTPUT_FILE_NAME);
    fs::write(&output_path, "stale").unwrap();

    let mut etl = ShapeOsmEtl::new(&config);
    assert!(etl.is_cached(&output_dir).unwrap());
    etl.process(&output_dir).unwrap();
    assert_eq!(fs::read_to_string(&output_path).unwrap(), "stale");

    etl.clean(&output_dir).unwrap();
    assert!(!etl.is_cached(&output_dir).unwrap());
    etl.process(&output_dir).unwrap();
    assert_eq!(read_json_lines(&output_path).len(), 5);
}

#[test]
fn missing_input_fails_the_step() {
    let dest = tempfile::tempdir().unwrap();
    let config = test_config(&dest.path().join("nowhere.osm"), &dest);
    let output_dir = create_output_dir(&config).unwrap();

    assert!(ShapeOsmEtl::new(&config).process(&output_dir).is_err());
    assert!(!output_dir.join(OUTPUT_FILE_NAME).exists());
}

#[test]
fn failed_run_leaves_nothing_cached() {
    let input = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let data_path = input.path().join("broken.osm");
    fs::write(
        &data_path,
        r#"<osm>
  <node id="1" lat="41.97" lon="-87.68"><tag k="amenity" v="cafe"/></node>
  <node id="2" lat="41.98" lon="-87.69"></way>
</osm>"#,
    )
    .unwrap();

    let config = test_config(&data_path, &dest);
    let output_dir = create_output_dir(&config).unwrap();
    let mut etl = ShapeOsmEtl::new(&config);

    assert!(etl.process(&output_dir).is_err());
    assert!(!etl.is_cached(&output_dir).unwrap());
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
}

#[test]
fn reads_xz_compressed_input() {
    let input = tempfile::tempdir().unwrap();
    let dest = tempfile::tempdir().unwrap();
    let xz_path = input.path().join("example.osm.xz");
    let mut encoder = xz::write::XzEncoder::new(fs::File::create(&xz_path).unwrap(), 6);
    encoder.write_all(&fs::read(fixture_path()).unwrap()).unwrap();
    encoder.finish().unwrap();

    let config = test_config(&xz_path, &dest);
    let output_dir = create_output_dir(&config).unwrap();
    ShapeOsmEtl::new(&config).process(&output_dir).unwrap();

    assert_eq!(read_json_lines(&output_dir.join(OUTPUT_FILE_NAME)).len(), 5);
}

#[test]
fn audit_reports_street_types_and_key_shapes() {
    let dest = tempfile::tempdir().unwrap();
    let config = test_config(&fixture_path(), &dest);
    let output_dir = create_output_dir(&config).unwrap();

    let mut etl = AuditOsmEtl::new(&config);
    etl.process(&output_dir).unwrap();

    let text = fs::read_to_string(etl.output_path(&output_dir)).unwrap();
    let report: AuditReport = serde_json::from_str(&text).unwrap();

    let street_types: Vec<&str> = report.street_types.keys().map(String::as_str).collect();
    assert_eq!(street_types, vec!["Ave", "St."]);
    assert!(report.street_types["St."].contains("West Lexington St."));
    assert_eq!(report.key_types.lower, 11);
    assert_eq!(report.key_types.lower_colon, 9);
    assert_eq!(report.key_types.other, 1);
    assert_eq!(report.key_types.problemchars, 0);
}
