use super::row::{MsaByRow, GAP, PAD};

/// Base counts of one MSA column. Ambiguity codes are tallied as `N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCounts {
    pub a: usize,
    pub c: usize,
    pub g: usize,
    pub t: usize,
    pub gap: usize,
    pub n: usize,
}

impl ColumnCounts {
    fn add(&mut self, base: u8) {
        match base {
            b'A' => self.a += 1,
            b'C' => self.c += 1,
            b'G' => self.g += 1,
            b'T' => self.t += 1,
            GAP => self.gap += 1,
            PAD => {}
            _ => self.n += 1,
        }
    }

    /// Most frequent symbol, first in `A C G T - N` order on ties; `N` for an empty column.
    pub fn majority_base(&self) -> char {
        let counts = [
            ('A', self.a),
            ('C', self.c),
            ('G', self.g),
            ('T', self.t),
            ('-', self.gap),
            ('N', self.n),
        ];
        let mut best = ('N', 0);
        for (base, count) in counts {
            if count > best.1 {
                best = (base, count);
            }
        }
        best.0
    }
}

/// Per-position base frequencies over the MSA window.
#[derive(Debug, Clone)]
pub struct MsaByColumn {
    begin: usize,
    columns: Vec<ColumnCounts>,
}

impl MsaByColumn {
    pub fn new(msa: &MsaByRow) -> Self {
        let mut columns = vec![ColumnCounts::default(); msa.end - msa.begin];
        for row in &msa.rows {
            let offset = row.begin - msa.begin;
            for (i, &base) in row.bases.iter().enumerate() {
                columns[offset + i].add(base);
            }
        }
        Self {
            begin: msa.begin,
            columns,
        }
    }

    pub fn get(&self, pos: usize) -> Option<&ColumnCounts> {
        if pos < self.begin {
            return None;
        }
        self.columns.get(pos - self.begin)
    }
}
