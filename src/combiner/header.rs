use crate::combiner::encoding::LineEncoding;
use crate::combiner::line_reader::LineReader;
use crate::error::{ReaderError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One record as read from a source file, terminator included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Line {
    Bytes(Vec<u8>),
    Text(String),
}

impl Line {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Line::Bytes(bytes) => bytes,
            Line::Text(text) => text.as_bytes(),
        }
    }

    /// Printable form with control characters and the terminator escaped.
    pub fn escaped(&self) -> String {
        match self {
            Line::Bytes(bytes) => bytes.escape_ascii().to_string(),
            Line::Text(text) => text.escape_debug().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Compare the first line of the first two files.
    #[default]
    Auto,
    /// Take this many leading lines of the first file, no comparison.
    Fixed(usize),
}

impl HeaderMode {
    pub fn from_forced(forced: Option<usize>) -> Self {
        forced.map_or(HeaderMode::Auto, HeaderMode::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderVariant {
    lines: Vec<Line>,
}

impl HeaderVariant {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn escaped_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::escaped).collect()
    }

    /// Multi-line rendering for logs, each line indented by four spaces.
    pub fn display_indented(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("    {}", line.escaped()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A header variant and every file whose leading lines equal it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGroup {
    variant: HeaderVariant,
    files: BTreeSet<PathBuf>,
}

impl HeaderGroup {
    pub fn new(variant: HeaderVariant) -> Self {
        Self {
            variant,
            files: BTreeSet::new(),
        }
    }

    pub fn with_files<I, P>(variant: HeaderVariant, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            variant,
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn variant(&self) -> &HeaderVariant {
        &self.variant
    }

    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    pub fn add_file<P: Into<PathBuf>>(&mut self, path: P) -> bool {
        self.files.insert(path.into())
    }
}

/// File `path` under the first group whose variant equals `candidate`,
/// registering a new group when none does. Returns the group index.
pub fn assign_to_group(groups: &mut Vec<HeaderGroup>, candidate: HeaderVariant, path: &Path) -> usize {
    if let Some(index) = groups.iter().position(|g| g.variant == candidate) {
        groups[index].add_file(path);
        return index;
    }

    groups.push(HeaderGroup::with_files(candidate, [path]));
    groups.len() - 1
}

/// Work out the canonical header for a run.
///
/// In [`HeaderMode::Auto`] only the very first line of `files[0]` and
/// `files[1]` is compared, so the result has zero or one line. Two files that
/// are both empty yield an empty header.
pub fn determine_header(
    files: &[PathBuf],
    mode: HeaderMode,
    encoding: LineEncoding,
    buffer_size: usize,
) -> Result<HeaderVariant> {
    match mode {
        HeaderMode::Fixed(count) => {
            let first = files
                .first()
                .ok_or(ReaderError::NotEnoughFiles { found: files.len() })?;
            let mut reader = LineReader::open(first, encoding, buffer_size)?;
            Ok(HeaderVariant::new(reader.read_lines(count)?))
        }
        HeaderMode::Auto => {
            let [first, second, ..] = files else {
                return Err(ReaderError::NotEnoughFiles { found: files.len() }.into());
            };

            let line1 = LineReader::open(first, encoding, buffer_size)?.next_line()?;
            let line2 = LineReader::open(second, encoding, buffer_size)?.next_line()?;

            match (line1, line2) {
                (Some(a), Some(b)) if a == b => Ok(HeaderVariant::new(vec![a])),
                _ => Ok(HeaderVariant::empty()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn bytes(s: &str) -> Line {
        Line::Bytes(s.as_bytes().to_vec())
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_variants_are_equal() {
        assert_eq!(HeaderVariant::empty(), HeaderVariant::new(Vec::new()));

        let mut groups = vec![HeaderGroup::new(HeaderVariant::empty())];
        let index = assign_to_group(&mut groups, HeaderVariant::empty(), Path::new("b.csv"));
        assert_eq!(index, 0);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_variant_equality_is_elementwise() {
        let a = HeaderVariant::new(vec![bytes("id,val\n"), bytes("int,str\n")]);
        let b = HeaderVariant::new(vec![bytes("id,val\n"), bytes("int,str\n")]);
        let c = HeaderVariant::new(vec![bytes("id,val\n"), bytes("int,int\n")]);
        let short = HeaderVariant::new(vec![bytes("id,val\n")]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, short);
    }

    #[test]
    fn test_assign_registers_new_groups_in_first_seen_order() {
        let canonical = HeaderVariant::new(vec![bytes("id,val\n")]);
        let other = HeaderVariant::new(vec![bytes("x,y\n")]);
        let mut groups = vec![HeaderGroup::new(canonical.clone())];

        assert_eq!(assign_to_group(&mut groups, canonical, Path::new("a.csv")), 0);
        assert_eq!(assign_to_group(&mut groups, other.clone(), Path::new("b.csv")), 1);
        assert_eq!(assign_to_group(&mut groups, other, Path::new("c.csv")), 1);

        assert_eq!(groups.len(), 2);
        assert!(groups[0].files().contains(Path::new("a.csv")));
        assert_eq!(groups[1].files().len(), 2);
    }

    #[test]
    fn test_group_files_are_a_set() {
        let mut group = HeaderGroup::with_files(HeaderVariant::empty(), ["a.csv", "b.csv"]);
        assert!(!group.add_file("a.csv"));
        assert_eq!(group.files().len(), 2);
    }

    #[test]
    fn test_auto_detect_matching_first_lines() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "id,val\n1,x\n");
        let b = write(&dir, "b.csv", "id,val\n3,z\n");

        let header = determine_header(&[a, b], HeaderMode::Auto, LineEncoding::Binary, 4096).unwrap();
        assert_eq!(header.lines(), &[bytes("id,val\n")]);
    }

    #[test]
    fn test_auto_detect_differing_first_lines() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "id,val\n1,x\n");
        let b = write(&dir, "b.csv", "x,y\n3,z\n");

        let header = determine_header(&[a, b], HeaderMode::Auto, LineEncoding::Binary, 4096).unwrap();
        assert!(header.is_empty());
    }

    #[test]
    fn test_auto_detect_only_compares_first_line() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "id,val\nint,str\n1,x\n");
        let b = write(&dir, "b.csv", "id,val\nint,str\n2,y\n");

        let header = determine_header(&[a, b], HeaderMode::Auto, LineEncoding::Binary, 4096).unwrap();
        assert_eq!(header.len(), 1);
    }

    #[test]
    fn test_auto_detect_two_empty_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "");
        let b = write(&dir, "b.csv", "");

        let header = determine_header(&[a, b], HeaderMode::Auto, LineEncoding::Binary, 4096).unwrap();
        assert!(header.is_empty());
    }

    #[test]
    fn test_fixed_header_reads_first_file_only() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "# export\nid,val\n1,x\n");
        let b = write(&dir, "b.csv", "something else\n");

        let header =
            determine_header(&[a, b], HeaderMode::Fixed(2), LineEncoding::Binary, 4096).unwrap();
        assert_eq!(header.lines(), &[bytes("# export\n"), bytes("id,val\n")]);
    }

    #[test]
    fn test_fixed_header_short_read() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "only\n");
        let b = write(&dir, "b.csv", "only\n");

        let header =
            determine_header(&[a, b], HeaderMode::Fixed(3), LineEncoding::Binary, 4096).unwrap();
        assert_eq!(header.len(), 1);
    }

    #[test]
    fn test_auto_detect_needs_two_files() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.csv", "id\n");

        let err = determine_header(&[a], HeaderMode::Auto, LineEncoding::Binary, 4096).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CombineError::Reader(ReaderError::NotEnoughFiles { found: 1 })
        ));
    }

    #[test]
    fn test_escaped_line() {
        assert_eq!(bytes("id,val\r\n").escaped(), "id,val\\r\\n");
        assert_eq!(Line::Text("naïve\n".to_string()).escaped(), "naïve\\n");
    }

    #[test]
    fn test_header_mode_from_forced() {
        assert_eq!(HeaderMode::from_forced(None), HeaderMode::Auto);
        assert_eq!(HeaderMode::from_forced(Some(0)), HeaderMode::Fixed(0));
    }
}
