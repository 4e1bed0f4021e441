use crate::error::{Error, Result};
use crate::index::{Posting, TermLocation};
use crate::persist::IndexPaths;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;

/// Index of the shard holding `term`: shard `i` covers
/// `[breakpoints[i-1], breakpoints[i])`.
pub fn shard_for_term(breakpoints: &[String], term: &str) -> usize {
    breakpoints.partition_point(|b| b.as_str() <= term)
}

struct Shard {
    path: PathBuf,
    reader: Mutex<BufReader<File>>,
}

/// The open shard files of one index. Each handle has its own lock, so
/// reads on different shards never contend.
pub struct ShardStore {
    root: PathBuf,
    shards: Vec<Shard>,
}

impl ShardStore {
    /// Open every shard or none: on failure the handles opened so far are
    /// dropped before the error is returned.
    pub fn open(paths: &IndexPaths, prefix: &str, count: usize) -> Result<Self> {
        let shards = (0..count)
            .map(|i| -> Result<Shard> {
                let path = paths.shard(prefix, i);
                let file = File::open(&path)
                    .map_err(|e| Error::unavailable(&path, format!("cannot open shard {i}: {e}")))?;
                Ok(Shard { path, reader: Mutex::new(BufReader::new(file)) })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { root: paths.root.clone(), shards })
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Seek to `loc` and decode the postings line for `term`.
    /// `field_cap` limits the fields decoded, header fields included.
    pub fn read_postings_at(&self, term: &str, loc: TermLocation, field_cap: Option<usize>) -> Result<(u32, Vec<Posting>)> {
        let shard = self.shards.get(loc.shard as usize).ok_or_else(|| {
            Error::corrupt(&self.root, format!("term {term:?} points to shard {} of {}", loc.shard, self.shards.len()))
        })?;

        let mut buf = Vec::new();
        {
            let mut reader = shard.reader.lock();
            reader.seek(SeekFrom::Start(loc.offset))?;
            reader.read_until(b'\n', &mut buf)?;
        }
        std::str::from_utf8(&buf)
            .map_err(|e| e.to_string())
            .and_then(|line| parse_postings_line(term, line, field_cap))
            .map_err(|cause| Error::corrupt(&shard.path, format!("offset {}: {cause}", loc.offset)))
    }
}

fn parse_postings_line(term: &str, line: &str, field_cap: Option<usize>) -> std::result::Result<(u32, Vec<Posting>), String> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let record = match rdr.records().next() {
        Some(rec) => rec.map_err(|e| e.to_string())?,
        None => return Err("no postings line at offset".into()),
    };

    let found = record.get(0).unwrap_or_default();
    if found != term {
        return Err(format!("expected term {term:?}, found {found:?}"));
    }
    let df = record
        .get(1)
        .and_then(|f| f.trim().parse::<u32>().ok())
        .filter(|df| *df > 0)
        .ok_or_else(|| format!("bad document frequency for {term:?}"))?;

    let end = field_cap.map_or(record.len(), |cap| cap.min(record.len()));
    let postings = (2..end)
        .map(|i| serde_json::from_str::<Posting>(&record[i]).map_err(|e| format!("posting {} of {term:?}: {e}", i - 2)))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((df, postings))
}
