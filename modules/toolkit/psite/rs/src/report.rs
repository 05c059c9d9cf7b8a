use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

use derive_getters::{Dissolve, Getters};
use eyre::Result;
use itertools::Itertools;

use ribobit_core_rs::ngs::Strandedness;
use ribobit_io_rs::WriteRecord;

use crate::distance::DistanceHistogram;
use crate::selection::PsiteRow;

pub const HEADER: [&str; 11] = [
    "#read_length",
    "proportion(per total mapped reads)",
    "predicted_psite",
    "number_of_codons_chosen",
    "f0_sum",
    "f1_sum",
    "f2_sum",
    "f0_percent",
    "pvalue1",
    "pvalue2",
    "pvalue_combined",
];

pub const STATUS_COLUMN: &str = "status";

pub const SUMMARY_HEADER: [&str; 5] = [
    "SampleName",
    "AlignmentFile",
    "Stranded(yes/reverse)",
    "P-siteReadLength",
    "P-siteLocations",
];

/// Percentage with two decimals, e.g. 0.12345 -> "12.35%".
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Columns and rows of the P-site report.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Layout {
    /// Accepted read lengths only, with the classic set of columns.
    #[default]
    Classic,
    /// Every evaluated read length, with a trailing status column holding the verdict.
    WithStatus,
}

/// Tab-separated P-site report. The header is written on construction, every row is commented
/// out with "# " so that the file can be used as a template for a manual configuration.
pub struct Writer<W: Write> {
    writer: W,
    layout: Layout,
}

impl<W: Write> Writer<W> {
    pub fn new(mut writer: W, layout: Layout) -> Result<Self> {
        match layout {
            Layout::Classic => writeln!(writer, "{}", HEADER.join("\t"))?,
            Layout::WithStatus => {
                writeln!(writer, "{}\t{}", HEADER.join("\t"), STATUS_COLUMN)?
            }
        }
        Ok(Self { writer, layout })
    }

    /// Close the table with a blank line followed by the summary, if there is one.
    pub fn write_summary(&mut self, summary: Option<&Summary>) -> Result<()> {
        writeln!(self.writer)?;
        if let Some(summary) = summary {
            writeln!(self.writer, "# {}", SUMMARY_HEADER.join("\t"))?;
            writeln!(self.writer, "{summary}")?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> WriteRecord for Writer<W> {
    type Record = PsiteRow;

    fn write_record(&mut self, record: &Self::Record) -> Result<()> {
        if self.layout == Layout::Classic && !record.verdict().is_accepted() {
            return Ok(());
        }

        let [f0, f1, f2] = record.frame_sums();
        write!(
            self.writer,
            "# {}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:e}\t{:e}\t{:e}",
            record.length(),
            percent(*record.library_share()),
            record.offset(),
            record.codons(),
            f0,
            f1,
            f2,
            percent(*record.frame0_share()),
            record.pvalue1(),
            record.pvalue2(),
            record.pvalue_combined(),
        )?;
        match self.layout {
            Layout::Classic => writeln!(self.writer)?,
            Layout::WithStatus => writeln!(self.writer, "\t{}", record.verdict())?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One line summary of the predefined P-site offsets for a single alignment file.
#[derive(Clone, PartialEq, Eq, Debug, Dissolve, Getters)]
pub struct Summary {
    sample: String,
    alignment: PathBuf,
    strandedness: Strandedness,
    psites: BTreeMap<usize, i64>,
}

impl Summary {
    /// Returns None when there is nothing to summarize.
    pub fn new(
        alignment: impl AsRef<Path>,
        strandedness: Strandedness,
        psites: BTreeMap<usize, i64>,
    ) -> Option<Self> {
        if psites.is_empty() {
            return None;
        }
        let alignment = alignment.as_ref().to_path_buf();
        Some(Self {
            sample: Self::sample_name(&alignment),
            alignment,
            strandedness,
            psites,
        })
    }

    /// Sample name is the alignment file name without its extension.
    pub fn sample_name(path: &Path) -> String {
        path.file_stem()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.sample,
            self.alignment.display(),
            self.strandedness.config_token(),
            self.psites.keys().join(","),
            self.psites.values().join(",")
        )
    }
}

/// Dump a distance histogram as text, one read length per line: `<length>:\t<count>\t...`.
pub fn write_histogram(writer: &mut impl Write, histogram: &DistanceHistogram) -> Result<()> {
    for (length, row) in histogram.rows() {
        writeln!(writer, "{}:\t{}", length, row.iter().join("\t"))?;
    }
    Ok(())
}
