use super::csv_reader::{read_csv, CsvOptions};
use crate::error::{Error, Result};

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Recordings grouped by the folder they were found in.
///
/// Every row of `samples` is one recording and `labels[i]` is the name of the
/// folder that held it. All rows have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    samples: Vec<Vec<f64>>,
    labels: Vec<String>,
    sources: Vec<PathBuf>,
}

impl Dataset {
    /// Builds a dataset from every sub-folder of `root`, using the folder name
    /// as the label. Folders and files are read in name order.
    pub fn from_parent_folder<P: AsRef<Path>>(root: P, options: &CsvOptions) -> Result<Self> {
        let root = root.as_ref();
        let mut folders = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                folders.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
            }
        }
        folders.sort();

        Self::load(folders, options)
    }

    /// Builds a dataset from the named sub-folders of `root` only, in the
    /// order given.
    pub fn from_labeled_folders<P, S>(root: P, labels: &[S], options: &CsvOptions) -> Result<Self>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let root = root.as_ref();
        let folders = labels
            .iter()
            .map(|label| {
                let path = root.join(label.as_ref());
                if path.is_dir() {
                    Ok((label.as_ref().to_string(), path))
                } else {
                    Err(Error::Io(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("label folder not found: {}", path.display()),
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::load(folders, options)
    }

    fn load(folders: Vec<(String, PathBuf)>, options: &CsvOptions) -> Result<Self> {
        let mut files = Vec::new();
        for (label, folder) in folders {
            for path in recording_files(&folder, &options.extension)? {
                files.push((label.clone(), path));
            }
        }

        let samples = files
            .par_iter()
            .map(|(_, path)| read_csv(path, options))
            .collect::<Result<Vec<_>>>()?;

        let (labels, sources): (Vec<String>, Vec<PathBuf>) = files.into_iter().unzip();

        if let Some(expected) = samples.first().map(Vec::len) {
            if let Some((row, source)) = samples
                .iter()
                .zip(sources.iter())
                .find(|(row, _)| row.len() != expected)
            {
                return Err(Error::RaggedDataset {
                    expected,
                    actual: row.len(),
                    source_path: source.clone(),
                });
            }
        }

        Ok(Self {
            samples,
            labels,
            sources,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Samples per recording, `None` for an empty dataset.
    pub fn recording_len(&self) -> Option<usize> {
        self.samples.first().map(Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path, &[f64])> {
        self.labels
            .iter()
            .zip(self.sources.iter())
            .zip(self.samples.iter())
            .map(|((label, source), samples)| (label.as_str(), source.as_path(), samples.as_slice()))
    }

    pub fn label_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

fn recording_files(folder: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
