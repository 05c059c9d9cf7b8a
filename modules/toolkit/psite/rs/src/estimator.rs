use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use derive_getters::{Dissolve, Getters};
use eyre::{Result, WrapErr};

use ribobit_core_rs::ngs::Strandedness;
use ribobit_io_rs::{AlignmentSource, WriteRecord};

use crate::annotation::{select_transcripts, Annotation};
use crate::config::Config;
use crate::distance::{self, DistanceHistogram, Distances};
use crate::metaplot::Metaplot;
use crate::report::{self, Layout, Summary};
use crate::selection::Selection;

/// End-to-end P-site estimation for a single alignment source.
#[derive(Clone, Debug, Getters)]
pub struct Estimator {
    config: Config,
}

impl Estimator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate().wrap_err("Invalid P-site estimation config")?;
        Ok(Self { config })
    }

    /// Select reference transcripts, stream the alignments and evaluate every read length.
    pub fn run(
        &self,
        annotation: &Annotation,
        source: &mut impl AlignmentSource,
    ) -> Result<Estimate> {
        log::info!(
            "Estimating P-site offsets for {} (stranded: {}, read lengths {}-{})",
            source.filename().display(),
            self.config.strandedness,
            self.config.min_length,
            self.config.max_length
        );

        let selected = select_transcripts(annotation)?;
        let distances = distance::accumulate(source, &selected, annotation, &self.config)?;
        let selection = Selection::evaluate(&distances, &self.config.thresholds);

        Ok(Estimate {
            alignment: source.filename().to_path_buf(),
            strandedness: self.config.strandedness,
            layout: self.config.layout,
            distances,
            selection,
        })
    }
}

/// Results of a single estimation run.
#[derive(Clone, PartialEq, Debug, Dissolve, Getters)]
pub struct Estimate {
    alignment: PathBuf,
    strandedness: Strandedness,
    layout: Layout,
    distances: Distances,
    selection: Selection,
}

impl Estimate {
    /// Summary line for the predefined P-site lengths, if any.
    pub fn summary(&self) -> Option<Summary> {
        Summary::new(
            &self.alignment,
            self.strandedness,
            self.selection.predefined(),
        )
    }

    pub fn metaplot(&self) -> Metaplot {
        Metaplot::new(&self.distances, &self.selection.predefined())
    }

    /// Write the full report: per-length rows, a blank line and the summary.
    pub fn write_report(&self, writer: impl Write) -> Result<()> {
        let mut writer = report::Writer::new(writer, self.layout)?;
        writer.write_records(self.selection.rows())?;
        writer.write_summary(self.summary().as_ref())?;
        writer.flush()
    }

    /// Save `<prefix>_pre_config.txt` together with start/stop codon distance dumps
    /// `<prefix>_start_codon_distances.txt` and `<prefix>_stop_codon_distances.txt`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();

        let path = with_suffix(prefix, "_pre_config.txt");
        self.write_report(create(&path)?)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

        for (suffix, histogram) in [
            ("_start_codon_distances.txt", self.distances.start()),
            ("_stop_codon_distances.txt", self.distances.stop()),
        ] {
            let path = with_suffix(prefix, suffix);
            dump(&path, histogram)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        }
        log::info!("Saved P-site report to {}", prefix.display());
        Ok(())
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn dump(path: &Path, histogram: &DistanceHistogram) -> Result<()> {
    let mut writer = create(path)?;
    report::write_histogram(&mut writer, histogram)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::new();
        config.set_length_range(35, 24);
        assert!(Estimator::new(config).is_err());
        assert!(Estimator::new(Config::default()).is_ok());
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("out/sample"), "_pre_config.txt"),
            PathBuf::from("out/sample_pre_config.txt")
        );
    }

    #[test]
    fn test_save() -> Result<()> {
        let estimate = Estimate {
            alignment: PathBuf::from("sample.bam"),
            strandedness: Strandedness::Forward,
            layout: Layout::Classic,
            distances: Distances::default(),
            selection: Selection::default(),
        };
        assert!(estimate.summary().is_none());
        assert!(estimate.metaplot().pages().is_empty());

        let dir = std::env::temp_dir().join(format!("ribobit-psite-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let prefix = dir.join("sample");
        estimate.save(&prefix)?;

        let report = std::fs::read_to_string(with_suffix(&prefix, "_pre_config.txt"))?;
        assert_eq!(report, format!("{}\n\n", report::HEADER.join("\t")));
        assert!(with_suffix(&prefix, "_start_codon_distances.txt").exists());
        assert!(with_suffix(&prefix, "_stop_codon_distances.txt").exists());

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
