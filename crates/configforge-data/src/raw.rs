//! Raw tables: rectangular grids of positioned cells

use configforge_core::Cell;

/// One field slot as laid out by the header's name row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    /// Column name from the name row
    pub name: String,

    /// Description from the first header row (empty if there is only one)
    pub desc: String,

    /// First raw column of the field
    pub start: usize,

    /// Number of raw columns the field spans
    pub span: usize,
}

/// Cells of one data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Lowercased dotted name
    pub name: String,

    /// All rows, header rows included
    pub rows: Vec<Vec<Cell>>,

    /// Widest row
    pub width: usize,
}

impl RawTable {
    /// Build from rows of strings, assigning cell positions
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(r, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(c, data)| Cell::new(r, c, data))
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    /// Convenience constructor for literal grids
    pub fn from_strs(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        Self::from_rows(
            name,
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    /// Data rows after `header_rows`, with blank rows skipped and short rows
    /// padded to `width` with empty cells
    pub fn data_rows(&self, header_rows: usize, width: usize) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .skip(header_rows)
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .map(|row| {
                let mut row = row.clone();
                if let Some(first) = row.first() {
                    let r = first.row;
                    while row.len() < width {
                        let c = row.len();
                        row.push(Cell::new(r, c, ""));
                    }
                }
                row
            })
            .collect()
    }

    /// Field layout from the header rows
    ///
    /// The last header row holds names; the first (when there are at least
    /// two) holds descriptions. A named cell opens a field, following
    /// unnamed cells of the name row extend it. Data hiding under an unnamed
    /// leading column is returned as the error value.
    pub fn header_fields(&self, header_rows: usize) -> Result<Vec<HeaderField>, Cell> {
        if header_rows == 0 || self.rows.len() < header_rows {
            return Ok(Vec::new());
        }
        let names = &self.rows[header_rows - 1];
        let descs = if header_rows >= 2 { Some(&self.rows[0]) } else { None };

        let mut fields: Vec<HeaderField> = Vec::new();
        for c in 0..names.len() {
            let name = names.get(c).map(|cell| cell.data.trim()).unwrap_or("");
            if !name.is_empty() {
                let desc = descs
                    .and_then(|d| d.get(c))
                    .map(|cell| cell.data.trim().to_string())
                    .unwrap_or_default();
                fields.push(HeaderField {
                    name: name.to_string(),
                    desc,
                    start: c,
                    span: 1,
                });
                continue;
            }

            match fields.last_mut() {
                Some(field) => field.span += 1,
                None => {
                    // Unnamed leading column: fine only if it is empty everywhere
                    if let Some(cell) = self
                        .rows
                        .iter()
                        .skip(header_rows)
                        .filter_map(|row| row.get(c))
                        .find(|cell| !cell.is_empty())
                    {
                        return Err(cell.clone());
                    }
                }
            }
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_assigned() {
        let table = RawTable::from_strs("items", &[&["id", "name"], &["1", "sword"]]);
        assert_eq!(table.rows[1][1], Cell::new(1, 1, "sword"));
        assert_eq!(table.width, 2);
    }

    #[test]
    fn header_spans() {
        let table = RawTable::from_strs(
            "items",
            &[
                &["id", "drops", "", ""],
                &["id", "rewards", "", ""],
                &["1", "10", "20", ""],
            ],
        );
        let fields = table.header_fields(2).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "rewards");
        assert_eq!(fields[1].desc, "drops");
        assert_eq!((fields[1].start, fields[1].span), (1, 3));
    }

    #[test]
    fn data_before_first_name() {
        let table = RawTable::from_strs("items", &[&["", "id"], &["x", "1"]]);
        let cell = table.header_fields(1).unwrap_err();
        assert_eq!((cell.row, cell.col), (1, 0));
    }

    #[test]
    fn data_rows_pad_and_skip_blank() {
        let table = RawTable::from_strs(
            "items",
            &[&["id", "name"], &["1"], &["", ""], &["2", "axe"]],
        );
        let rows = table.data_rows(1, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Cell::new(1, 1, ""));
        assert_eq!(rows[1][1].data, "axe");
    }
}
