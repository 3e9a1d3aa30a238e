//! CSV load/save for the record table.
//!
//! One record per line, comma-separated, standard CSV quoting, no header.
//! Rows may have any number of fields; rows with fewer than
//! [`Record::MIN_FIELDS`] are skipped on load and can never be written.
//!
//! The reader drops a UTF-8 byte-order mark at the start of the file, so a
//! first record whose host begins with U+FEFF is written fully quoted.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use tracing::debug;

use crate::record::Record;

/// Read every record from `path`, creating an empty file if it is missing.
pub(crate) fn load(path: &Path) -> io::Result<Vec<Record>> {
    let file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!(?path, error = %e, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };
        match Record::from_fields(row.iter().map(str::to_string).collect()) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(?path, records = records.len(), skipped, "record file loaded");
    Ok(records)
}

/// Rewrite `path` with `records`.
///
/// With `atomic` set, the rows go to a temporary file in the same directory
/// which then replaces `path`; otherwise `path` is truncated and rewritten in
/// place.
pub(crate) fn save(path: &Path, records: &[Record], atomic: bool) -> io::Result<()> {
    if atomic {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        write_records(tmp.as_file_mut(), records)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
    } else {
        let mut file = File::create(path)?;
        write_records(&mut file, records)?;
        file.sync_all()?;
    }
    debug!(?path, records = records.len(), atomic, "record file written");
    Ok(())
}

const BOM: char = '\u{feff}';

fn builder(style: QuoteStyle) -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false).flexible(true).quote_style(style);
    builder
}

fn write_records<W: Write>(mut out: W, records: &[Record]) -> io::Result<()> {
    let mut rest = records;
    if let Some((first, tail)) = records.split_first() {
        if first.host().starts_with(BOM) {
            let mut quoted = builder(QuoteStyle::Always).from_writer(&mut out);
            quoted.write_record(first.fields())?;
            quoted.flush()?;
            rest = tail;
        }
    }

    let mut writer = builder(QuoteStyle::Necessary).from_writer(&mut out);
    for record in rest {
        writer.write_record(record.fields())?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw: &[&str]) -> Record {
        Record::from_fields(raw.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");

        let records = load(&path).unwrap();
        assert!(records.is_empty());
        assert!(path.is_file());
    }

    #[test]
    fn load_skips_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        std::fs::write(
            &path,
            "10.0.0.5,t1,home\nlonely\n10.0.0.6,t2\n\nhost-c,t3,a,b,c\n",
        )
        .unwrap();

        let records = load(&path).unwrap();
        assert_eq!(
            records,
            vec![
                record(&["10.0.0.5", "t1", "home"]),
                record(&["10.0.0.6", "t2"]),
                record(&["host-c", "t3", "a", "b", "c"]),
            ]
        );
    }

    #[test]
    fn load_skips_rows_that_are_not_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        let mut raw = b"10.0.0.5,t1,home\n".to_vec();
        raw.extend_from_slice(b"bad,\xff\xfe,x\n");
        raw.extend_from_slice(b"10.0.0.6,t2,nas\n");
        std::fs::write(&path, raw).unwrap();

        let records = load(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].host(), "10.0.0.6");
    }

    #[test]
    fn save_quotes_embedded_delimiters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        let records = vec![record(&["host, with comma", "t \"1\"", "line\nbreak"])];

        save(&path, &records, false).unwrap();
        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn save_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        std::fs::write(&path, "a-very-long-host-name,2024-01-01T00:00:00Z,x,y,z\n").unwrap();

        save(&path, &[record(&["h", "t"])], false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "h,t\n");
    }

    #[test]
    fn reload_of_saved_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        std::fs::write(&path, "10.0.0.5,t1,home\nshort\n\"q,uoted\",t2\n").unwrap();

        let first = load(&path).unwrap();
        save(&path, &first, false).unwrap();
        let written = std::fs::read(&path).unwrap();

        let second = load(&path).unwrap();
        save(&path, &second, false).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&path).unwrap(), written);
    }

    #[test]
    fn leading_bom_in_first_host_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        let records = vec![
            record(&["\u{feff}h", "t", "x"]),
            record(&["\u{feff}k", "t2"]),
        ];

        save(&path, &records, false).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "\"\u{feff}h\",\"t\",\"x\"\n\u{feff}k,t2\n"
        );
        assert_eq!(load(&path).unwrap(), records);

        save(&path, &records, true).unwrap();
        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn atomic_save_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.csv");
        std::fs::write(&path, "old,t0\n").unwrap();

        save(&path, &[record(&["new", "t1", "alias"])], true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new,t1,alias\n");

        // No stray temp files left next to the target.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
