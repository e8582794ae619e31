use crate::utils::{open_reads_reader, Result};
use std::io::BufRead;
use std::path::Path;

/// Alignment-induced deletion.
pub const GAP: u8 = b'-';
/// Position outside the span a read covers.
pub const PAD: u8 = b' ';
/// Widest alignment window accepted, in bases.
pub const MAX_WINDOW_SPAN: usize = 1 << 20;

/// One aligned read. `bases[k]` sits at absolute position `begin + k`.
#[derive(Debug, Clone, PartialEq)]
pub struct MsaRow {
    pub name: String,
    pub begin: usize,
    pub bases: Vec<u8>,
}

impl MsaRow {
    pub fn new(name: impl Into<String>, begin: usize, bases: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            begin,
            bases: bases.into(),
        }
    }

    pub fn end(&self) -> usize {
        self.begin.saturating_add(self.bases.len())
    }

    /// Triplet starting at absolute `pos`; `None` if any base lies outside the
    /// row or on padding.
    pub fn codon_at(&self, pos: usize) -> Option<&[u8]> {
        let offset = pos.checked_sub(self.begin)?;
        let codon = self.bases.get(offset..offset.checked_add(3)?)?;
        if codon.contains(&PAD) {
            None
        } else {
            Some(codon)
        }
    }
}

/// All reads over a shared absolute window `[begin, end)`.
#[derive(Debug, Clone)]
pub struct MsaByRow {
    pub rows: Vec<MsaRow>,
    pub begin: usize,
    pub end: usize,
}

impl MsaByRow {
    /// Rejects an empty read set, reads running past `usize::MAX` and windows
    /// wider than `MAX_WINDOW_SPAN`.
    pub fn new(rows: Vec<MsaRow>) -> Result<Self> {
        let begin = rows
            .iter()
            .map(|r| r.begin)
            .min()
            .ok_or("No aligned reads found")?;
        let mut end = begin;
        for row in &rows {
            let row_end = row.begin.checked_add(row.bases.len()).ok_or_else(|| {
                format!("Read {} at {} extends past the coordinate range", row.name, row.begin)
            })?;
            end = end.max(row_end);
        }
        if end - begin > MAX_WINDOW_SPAN {
            return Err(format!(
                "Alignment window {}-{} spans more than {} bases",
                begin, end, MAX_WINDOW_SPAN
            ));
        }
        Ok(Self { rows, begin, end })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = open_reads_reader(path)?;
        let msa = Self::from_reader(reader)
            .map_err(|e| format!("Failed to load reads from {}: {}", path.display(), e))?;
        log::info!(
            "Loaded {} aligned reads over window {}-{}",
            msa.rows.len(),
            msa.begin,
            msa.end
        );
        Ok(msa)
    }

    /// Parses `name<TAB>begin<TAB>bases` lines. Blank lines and `#` comments are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows = Vec::new();
        for (line_number, line) in reader.lines().enumerate() {
            let line =
                line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let row = parse_row(line).map_err(|e| format!("Line {}: {}", line_number + 1, e))?;
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_row(line: &str) -> Result<MsaRow> {
    const EXPECTED_FIELD_COUNT: usize = 3;
    let fields: Vec<&str> = line.splitn(EXPECTED_FIELD_COUNT, '\t').collect();
    let (name, begin, bases) = match &fields[..] {
        [name, begin, bases] => (*name, *begin, *bases),
        _ => {
            return Err(format!(
                "Expected {} tab-separated fields in the format 'name begin bases', found {}",
                EXPECTED_FIELD_COUNT,
                fields.len()
            ))
        }
    };
    if name.is_empty() {
        return Err("Read name cannot be empty".to_string());
    }
    let begin: usize = begin
        .trim()
        .parse()
        .map_err(|_| format!("Invalid begin position '{}' for read {}", begin, name))?;
    let bases = bases.to_ascii_uppercase().into_bytes();
    if let Some(&bad) = bases.iter().find(|&&b| !is_alignment_symbol(b)) {
        return Err(format!(
            "Invalid base '{}' in read {}",
            char::from(bad).escape_default(),
            name
        ));
    }
    Ok(MsaRow::new(name, begin, bases))
}

fn is_alignment_symbol(base: u8) -> bool {
    matches!(
        base,
        b'A' | b'C'
            | b'G'
            | b'T'
            | b'N'
            | b'R'
            | b'Y'
            | b'S'
            | b'W'
            | b'K'
            | b'M'
            | b'B'
            | b'D'
            | b'H'
            | b'V'
            | GAP
            | PAD
    )
}
