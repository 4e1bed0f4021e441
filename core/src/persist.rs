use crate::error::{Error, Result};
use crate::index::{DocId, DocRecord, Directory, IndexMeta, InvertedIndex, Posting, TermLocation};
use crate::shard::shard_for_term;
use crate::tokenizer::stem;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn meta_index(&self) -> PathBuf { self.root.join("meta_index.json") }
    pub fn documents(&self) -> PathBuf { self.root.join("documents.csv") }
    pub fn stopwords(&self) -> PathBuf { self.root.join("stop_words.txt") }
    pub fn shard(&self, prefix: &str, shard: usize) -> PathBuf {
        self.root.join(format!("{prefix}{shard}.csv"))
    }
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::unavailable(path, format!("{what} not readable: {e}")))
}

pub fn load_meta(paths: &IndexPaths) -> Result<IndexMeta> {
    let path = paths.meta();
    let buf = read_file(&path, "metadata file")?;
    serde_json::from_str(&buf).map_err(|e| Error::unavailable(&path, format!("malformed metadata file: {e}")))
}

pub fn load_directory(paths: &IndexPaths) -> Result<Directory> {
    let path = paths.meta_index();
    let buf = read_file(&path, "meta index file")?;
    serde_json::from_str(&buf).map_err(|e| Error::unavailable(&path, format!("malformed meta index file: {e}")))
}

/// Load `documents.csv` (`id,url,lengthNormalizer`, no header).
pub fn load_documents(paths: &IndexPaths) -> Result<HashMap<DocId, DocRecord>> {
    let path = paths.documents();
    let malformed = |e: csv::Error| Error::unavailable(&path, format!("malformed document table: {e}"));
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(malformed)?;

    let mut docs = HashMap::new();
    for row in rdr.deserialize::<(DocId, String, f64)>() {
        let (id, url, length_normalizer) = row.map_err(malformed)?;
        if !(length_normalizer.is_finite() && length_normalizer > 0.0) {
            return Err(Error::unavailable(&path, format!("document {id} has length normalizer {length_normalizer}")));
        }
        docs.insert(id, DocRecord { url, length_normalizer });
    }
    Ok(docs)
}

/// Load a stopword list (one word per line); words are stemmed and deduplicated.
pub fn load_stopwords(path: &Path) -> Result<HashSet<String>> {
    let buf = read_file(path, "stopword file")?;
    Ok(buf
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(stem)
        .collect())
}

pub fn save_stopwords<S: AsRef<str>>(path: &Path, words: &[S]) -> Result<()> {
    let mut out = String::new();
    for w in words {
        out.push_str(w.as_ref());
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

pub fn save_meta(paths: &IndexPaths, meta: &IndexMeta) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta).map_err(std::io::Error::from)?;
    fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn save_directory(paths: &IndexPaths, directory: &Directory) -> Result<()> {
    // sorted for stable output
    let sorted: BTreeMap<_, _> = directory.iter().collect();
    let json = serde_json::to_string(&sorted).map_err(std::io::Error::from)?;
    fs::write(paths.meta_index(), json)?;
    Ok(())
}

pub fn save_documents(paths: &IndexPaths, documents: &BTreeMap<DocId, DocRecord>) -> Result<()> {
    let path = paths.documents();
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(|e| Error::unavailable(&path, e.to_string()))?;
    for (id, doc) in documents {
        wtr.serialize((id, &doc.url, doc.length_normalizer))
            .map_err(|e| Error::unavailable(&path, e.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Encode one postings line: `term,df,{"id":..,"frequency":..},...` plus newline.
pub fn encode_postings_line(term: &str, df: u32, postings: &[Posting]) -> Result<Vec<u8>> {
    let mut fields = Vec::with_capacity(postings.len() + 2);
    fields.push(term.to_string());
    fields.push(df.to_string());
    for p in postings {
        fields.push(serde_json::to_string(p).map_err(std::io::Error::from)?);
    }
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(&fields).map_err(std::io::Error::from)?;
    wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Lay out an in-memory index on disk: shard files partitioned by
/// `breakpoints`, the term directory, metadata and the document table.
pub fn write_index(paths: &IndexPaths, index: &InvertedIndex, prefix: &str, breakpoints: &[String]) -> Result<IndexMeta> {
    create_dir_all(&paths.root)?;
    let meta = IndexMeta {
        filename: prefix.to_string(),
        breakpoints: breakpoints.to_vec(),
        document_count: index.document_count,
    };

    let mut shards: Vec<Vec<u8>> = vec![Vec::new(); meta.shard_count()];
    let mut directory = Directory::with_capacity(index.postings.len());
    for (term, postings) in &index.postings {
        let shard = shard_for_term(breakpoints, term);
        let buf = &mut shards[shard];
        directory.insert(term.clone(), TermLocation { offset: buf.len() as u64, shard: shard as u32 });
        buf.extend(encode_postings_line(term, postings.len() as u32, postings)?);
    }

    for (i, buf) in shards.iter().enumerate() {
        fs::write(paths.shard(prefix, i), buf)?;
    }
    save_directory(paths, &directory)?;
    save_documents(paths, &index.documents)?;
    save_meta(paths, &meta)?;

    tracing::info!(root = %paths.root.display(), terms = directory.len(), shards = shards.len(), "index written");
    Ok(meta)
}

/// Load the header structures required to search: metadata, directory and documents.
pub fn load_index_header(paths: &IndexPaths) -> Result<(IndexMeta, Directory, HashMap<DocId, DocRecord>)> {
    let meta = load_meta(paths)?;
    let directory = load_directory(paths)?;
    let docs = load_documents(paths)?;
    Ok((meta, directory, docs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn postings_line_quotes_json_fields() {
        let line = encode_postings_line("cat", 2, &[Posting { id: 1, frequency: 3 }]).unwrap();
        let line = String::from_utf8(line).unwrap();
        assert!(line.starts_with("cat,2,"));
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }

    #[test]
    fn header_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut index = InvertedIndex::new();
        index.add_document(1, "https://a.example/", 2.5);
        index.add_document(2, "https://b.example/?q=x,y", 1.0);
        index.add_posting("apple", 1, 2);
        index.add_posting("zebra", 2, 1);
        let written = write_index(&paths, &index, "shard_", &["m".to_string()]).unwrap();

        let (meta, directory, docs) = load_index_header(&paths).unwrap();
        assert_eq!(meta, written);
        assert_eq!(meta.document_count, 2);
        assert_eq!(directory["apple"], TermLocation { offset: 0, shard: 0 });
        assert_eq!(directory["zebra"], TermLocation { offset: 0, shard: 1 });
        assert_eq!(docs[&2].url, "https://b.example/?q=x,y");
        assert!(paths.shard("shard_", 1).exists());
    }

    #[test]
    fn missing_meta_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = load_meta(&IndexPaths::new(dir.path())).unwrap_err();
        assert!(matches!(err, Error::IndexUnavailable { .. }));
    }

    #[test]
    fn stopwords_are_stemmed_and_deduplicated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stop_words.txt");
        fs::write(&path, "the\nThe\n\nbeing\n  a  \n").unwrap();
        let words = load_stopwords(&path).unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.contains("the"));
        assert!(words.contains(&stem("being")));
    }
}
