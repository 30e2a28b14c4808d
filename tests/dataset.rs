mod common;

use anyhow::Result;
use common::{generate_toy_records, toy_registry};
use recshard::{
    load_run_config, metadata_log_path, shard_paths, write_partitioned, Ratios, Shuffle,
    WriteOptions, RUN_CONFIG_FILENAME,
};

#[test]
fn partitioned_run_lays_out_train_eval_test() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let corpus = tmp.path().join("corpus");
    let root = tmp.path().join("dataset");
    let registry = toy_registry();
    let options = WriteOptions::default();

    let records = generate_toy_records(&corpus, 13, 24);
    let report = write_partitioned(
        &root,
        records,
        Ratios::new(&[0.5, 0.3, 0.2])?,
        Shuffle::Off,
        &registry,
        &options,
    )?;

    let counts: Vec<(String, usize)> = report
        .partitions
        .iter()
        .map(|p| (p.name.clone(), p.records))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("train".to_string(), 6),
            ("eval".to_string(), 3),
            ("test".to_string(), 4)
        ]
    );

    for part in &report.partitions {
        let dir = root.join(&part.name);
        assert!(!shard_paths(&dir, &options.shard_extension)?.is_empty());
        assert!(metadata_log_path(&dir).exists());
        assert_eq!(part.summary.processed, part.records);
    }
    assert!(root.join(RUN_CONFIG_FILENAME).exists());
    Ok(())
}

#[test]
fn bare_fraction_creates_no_test_directory() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let corpus = tmp.path().join("corpus");
    let root = tmp.path().join("dataset");
    let registry = toy_registry();

    let records = generate_toy_records(&corpus, 13, 24);
    let report = write_partitioned(
        &root,
        records,
        Ratios::train_fraction(0.8)?,
        Shuffle::Off,
        &registry,
        &WriteOptions::default(),
    )?;

    assert_eq!(report.partitions.len(), 2);
    assert_eq!(report.partitions[0].records, 10);
    assert_eq!(report.partitions[1].records, 3);
    assert!(root.join("train").is_dir());
    assert!(root.join("eval").is_dir());
    assert!(!root.join("test").exists());
    Ok(())
}

#[test]
fn run_config_snapshot_round_trips() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let corpus = tmp.path().join("corpus");
    let root = tmp.path().join("dataset");
    let registry = toy_registry();
    let options = WriteOptions {
        max_shard_bytes: 4_096,
        ..WriteOptions::default()
    };

    let records = generate_toy_records(&corpus, 10, 24);
    let written = write_partitioned(
        &root,
        records,
        Ratios::new(&[0.7, 0.3])?,
        Shuffle::Seeded(11),
        &registry,
        &options,
    )?;

    let loaded = load_run_config(&root)?;
    assert_eq!(loaded.max_shard_bytes, 4_096);
    assert_eq!(loaded.shard_extension, "rec");
    assert_eq!(loaded.shuffle, Shuffle::Seeded(11));
    assert_eq!(loaded.ratios, Ratios::new(&[0.7, 0.3])?);
    assert!(loaded.root.is_absolute());
    assert_eq!(loaded.partitions.len(), written.partitions.len());
    for (a, b) in loaded.partitions.iter().zip(&written.partitions) {
        assert_eq!(a.records, b.records);
        assert_eq!(a.summary, b.summary);
    }
    Ok(())
}
