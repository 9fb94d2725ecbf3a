use std::fs;

use assert_cmd::Command;

mod common;

use common::{voc_xml, write_config, write_voc_source, ObjectSpec};

fn voc2yolo() -> Command {
    let mut cmd = Command::cargo_bin("voc2yolo").unwrap();
    cmd.env_remove("VOC2YOLO_CONFIG");
    cmd
}

#[test]
fn runs() {
    voc2yolo().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = voc2yolo();
    cmd.arg("-V");
    cmd.assert().success().stdout("voc2yolo 0.1.0\n");
}

// Convert subcommand tests

#[test]
fn convert_writes_normalized_label_file() {
    let temp = tempfile::tempdir().unwrap();
    let xml_path = temp.path().join("000001.xml");
    let out_path = temp.path().join("000001.txt");
    fs::write(
        &xml_path,
        voc_xml(
            100,
            200,
            &[
                ObjectSpec::new("bicycle", (10.0, 30.0, 40.0, 80.0)),
                ObjectSpec::new("person", (0.0, 1.0, 0.0, 1.0)).difficult(1),
                ObjectSpec::new("unicorn", (0.0, 1.0, 0.0, 1.0)),
            ],
        ),
    )
    .unwrap();

    let mut cmd = voc2yolo();
    cmd.arg("convert").arg(&xml_path).arg(&out_path);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Wrote 1 record(s)"))
        .stdout(predicates::str::contains("dropped 1 difficult, 1 out-of-vocabulary"));

    assert_eq!(fs::read_to_string(&out_path).unwrap(), "1 0.2 0.3 0.2 0.2\n");
}

#[test]
fn convert_respects_classes_override() {
    let temp = tempfile::tempdir().unwrap();
    let classes = temp.path().join("classes.txt");
    let xml_path = temp.path().join("a.xml");
    let out_path = temp.path().join("a.txt");
    fs::write(&classes, "unicorn\nbicycle\n").unwrap();
    fs::write(
        &xml_path,
        voc_xml(10, 10, &[ObjectSpec::new("unicorn", (0.0, 10.0, 0.0, 10.0))]),
    )
    .unwrap();

    let mut cmd = voc2yolo();
    cmd.arg("--classes")
        .arg(&classes)
        .arg("convert")
        .arg(&xml_path)
        .arg(&out_path);
    cmd.assert().success();

    assert_eq!(fs::read_to_string(&out_path).unwrap(), "0 0.5 0.5 1.0 1.0\n");
}

#[test]
fn convert_malformed_annotation_fails() {
    let temp = tempfile::tempdir().unwrap();
    let xml_path = temp.path().join("bad.xml");
    fs::write(&xml_path, "<annotation><size><width>10</width></size></annotation>").unwrap();

    let mut cmd = voc2yolo();
    cmd.arg("convert")
        .arg(&xml_path)
        .arg(temp.path().join("bad.txt"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to parse VOC XML"));
}

#[test]
fn convert_zero_size_fails_with_geometry_error() {
    let temp = tempfile::tempdir().unwrap();
    let xml_path = temp.path().join("zero.xml");
    let out_path = temp.path().join("zero.txt");
    fs::write(
        &xml_path,
        voc_xml(0, 10, &[ObjectSpec::new("cat", (0.0, 1.0, 0.0, 1.0))]),
    )
    .unwrap();

    let mut cmd = voc2yolo();
    cmd.arg("convert").arg(&xml_path).arg(&out_path);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Invalid image geometry"));
    assert!(!out_path.exists());
}

// Prepare subcommand tests

#[test]
fn prepare_builds_split_tree_and_json_report() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), false);
    write_voc_source(
        &temp.path().join("VOC2007"),
        "val",
        &[(
            "000005",
            voc_xml(100, 200, &[ObjectSpec::new("bicycle", (10.0, 30.0, 40.0, 80.0))]),
        )],
    );

    let mut cmd = voc2yolo();
    cmd.arg("--config")
        .arg(&config)
        .args(["prepare", "--split", "val", "--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"split\": \"val\""))
        .stdout(predicates::str::contains("\"processed\": 1"))
        .stdout(predicates::str::contains("\"manifest_found\": false"));

    let dataset = temp.path().join("dataset");
    assert!(dataset.join("images/val/VOC2007_000005.jpg").is_file());
    assert_eq!(
        fs::read_to_string(dataset.join("labels/val/VOC2007_000005.txt")).unwrap(),
        "1 0.2 0.3 0.2 0.2\n"
    );
    assert!(fs::read_to_string(temp.path().join("data.yaml"))
        .unwrap()
        .contains("tvmonitor"));
}

#[test]
fn prepare_text_report_counts_images() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), false);
    write_voc_source(
        &temp.path().join("VOC2012"),
        "train",
        &[
            ("a", voc_xml(10, 10, &[])),
            ("b", voc_xml(10, 10, &[])),
        ],
    );

    let mut cmd = voc2yolo();
    cmd.arg("--config")
        .arg(&config)
        .args(["prepare", "--split", "train"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("train set is ready with 2 images."));

    let label = temp.path().join("dataset/labels/train/VOC2012_a.txt");
    assert_eq!(fs::read_to_string(label).unwrap(), "");
}

#[test]
fn prepare_strict_fails_on_missing_manifest() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), true);

    let mut cmd = voc2yolo();
    cmd.arg("--config")
        .arg(&config)
        .args(["prepare", "--split", "test"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Manifest not found"));
}

#[test]
fn prepare_unsupported_output_fails_before_writing() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), false);
    write_voc_source(
        &temp.path().join("VOC2007"),
        "train",
        &[("a", voc_xml(10, 10, &[ObjectSpec::new("cat", (0.0, 5.0, 0.0, 5.0))]))],
    );

    let mut cmd = voc2yolo();
    cmd.arg("--config")
        .arg(&config)
        .args(["prepare", "--split", "train", "--output", "xml"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("invalid value 'xml'"));

    assert!(!temp.path().join("dataset/images/train").exists());
    assert!(!temp.path().join("dataset/labels/train").exists());
    assert!(!temp.path().join("data.yaml").exists());
}

#[test]
fn prepare_rejects_unknown_split() {
    let mut cmd = voc2yolo();
    cmd.args(["prepare", "--split", "validation"]);
    cmd.assert().failure();
}

// Preview and detector glue

#[test]
fn preview_prints_pixel_boxes() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), false);
    write_voc_source(
        &temp.path().join("VOC2007"),
        "train",
        &[(
            "000005",
            voc_xml(100, 200, &[ObjectSpec::new("bicycle", (10.0, 30.0, 40.0, 80.0))]),
        )],
    );

    let mut prepare = voc2yolo();
    prepare
        .arg("--config")
        .arg(&config)
        .args(["prepare", "--split", "train"]);
    prepare.assert().success();

    let mut cmd = voc2yolo();
    cmd.arg("--config").arg(&config).arg("preview");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("VOC2007_000005.jpg (100x200)"))
        .stdout(predicates::str::contains("bicycle [10, 40, 30, 80]"));
}

#[test]
fn eval_without_weights_fails() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), false);

    let mut cmd = voc2yolo();
    cmd.arg("--config")
        .arg(&config)
        .args(["eval", "--record", "train7"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Trained weights not found"));
}

#[cfg(unix)]
#[test]
fn export_writes_classes_next_to_model() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config(temp.path(), false);
    // `true` accepts any arguments and exits 0, standing in for the detector CLI.
    let mut yaml = fs::read_to_string(&config).unwrap();
    yaml.push_str("detector_program: \"true\"\n");
    fs::write(&config, yaml).unwrap();

    let weights_dir = temp.path().join("runs/train/weights");
    fs::create_dir_all(&weights_dir).unwrap();
    fs::write(weights_dir.join("best.pt"), b"weights").unwrap();

    let mut cmd = voc2yolo();
    cmd.arg("--config").arg(&config).arg("export");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("best.onnx"))
        .stdout(predicates::str::contains("Wrote 20 class name(s)"));

    let classes = weights_dir.join("classes.txt");
    let vocab = voc2yolo::vocab::ClassVocabulary::from_classes_txt(&classes).unwrap();
    assert_eq!(vocab, voc2yolo::vocab::ClassVocabulary::pascal_voc());
}
