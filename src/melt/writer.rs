use crate::naming::{csv_path, format_number, is_current_dir};
use crate::tree::Node;
use crate::types::RowId;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// One CSV field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// A row identifier or foreign key
    Id(RowId),
    /// `seq` or `index`
    Position(usize),
    Value(&'a Node),
    Empty,
}

/// Writes header and rows of a single table
pub struct CsvWriter<W: Write> {
    writer: W,
    precision: usize,
    warnings: usize,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W, precision: usize) -> Self {
        CsvWriter {
            writer,
            precision,
            warnings: 0,
        }
    }

    /// Column names, comma-joined, as they are
    pub fn write_header(&mut self, columns: &[String]) -> io::Result<()> {
        writeln!(self.writer, "{}", columns.join(","))
    }

    pub fn write_row(&mut self, cells: &[Cell]) -> io::Result<()> {
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b",")?;
            }
            self.write_cell(cell)?;
        }
        self.writer.write_all(b"\n")
    }

    fn write_cell(&mut self, cell: &Cell) -> io::Result<()> {
        match cell {
            Cell::Id(id) => write!(self.writer, "{}", id),
            Cell::Position(pos) => write!(self.writer, "{}", pos),
            Cell::Empty => Ok(()),
            Cell::Value(node) => match node {
                Node::String(s) => write_quoted(&mut self.writer, s),
                Node::Number(n) => self.writer.write_all(format_number(*n, self.precision).as_bytes()),
                Node::Bool(b) => self.writer.write_all(if *b { "true" } else { "false" }.as_bytes()),
                Node::Null => Ok(()),
                Node::Object(_) | Node::Array(_) => {
                    tracing::warn!("complex value encountered in CSV cell, leaving it empty");
                    self.warnings += 1;
                    Ok(())
                }
            },
        }
    }

    /// Number of cells that held an object or array
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Quote a string, doubling interior quotes. Nothing else is escaped.
fn write_quoted<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    writer.write_all(b"\"")?;
    for (i, part) in s.split('"').enumerate() {
        if i > 0 {
            writer.write_all(b"\"\"")?;
        }
        writer.write_all(part.as_bytes())?;
    }
    writer.write_all(b"\"")
}

/// Creates one CSV file per table inside an output directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    precision: usize,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>, precision: usize) -> Self {
        CsvSink {
            dir: dir.into(),
            precision,
        }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        csv_path(&self.dir, table)
    }

    /// Create the output directory if it is missing.
    ///
    /// Only the last path component is created. Failures are logged and
    /// otherwise ignored: each table then fails on its own when opened.
    pub fn prepare(&self) {
        if is_current_dir(&self.dir) {
            return;
        }

        match std::fs::create_dir(&self.dir) {
            Ok(()) => tracing::debug!(dir = %self.dir.display(), "created output directory"),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => tracing::warn!(
                dir = %self.dir.display(),
                error = %e,
                "could not create output directory"
            ),
        }
    }

    /// Open (truncating) the file for `table`
    pub fn create(&self, table: &str) -> io::Result<CsvWriter<BufWriter<File>>> {
        let file = File::create(self.path_for(table))?;
        Ok(CsvWriter::new(BufWriter::new(file), self.precision))
    }
}
