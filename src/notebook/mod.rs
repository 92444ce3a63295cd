// src/notebook/mod.rs
// =============================================================================
// This module reads Jupyter notebooks (.ipynb files).
//
// A notebook is a JSON document with a top-level "cells" array. Each cell has
// a "cell_type" ("markdown", "code", "raw") and a "source", which nbformat
// stores either as a list of lines or as one string. We only care about the
// text of markdown cells; everything else is ignored.
//
// Submodules:
// - discover: Finds .ipynb files under the paths given on the command line
// =============================================================================

mod discover;

pub use discover::find_notebooks;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// A loaded notebook: where it came from and its cells, in order
#[derive(Debug, Clone)]
pub struct Notebook {
    pub path: PathBuf,
    pub cells: Vec<Cell>,
}

// One notebook cell
#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub cell_type: String,
    #[serde(default)]
    pub source: CellSource,
}

// The "source" field of a cell
//
// #[serde(untagged)] tries each variant in turn, so both
// "source": ["line 1\n", "line 2"] and "source": "line 1\nline 2" parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

// Only the part of the file format we read
#[derive(Deserialize)]
struct NotebookFile {
    #[serde(default)]
    cells: Vec<Cell>,
}

impl Cell {
    pub fn is_markdown(&self) -> bool {
        self.cell_type == "markdown"
    }

    /// The cell source joined into one string
    pub fn text(&self) -> String {
        match &self.source {
            CellSource::Lines(lines) => lines.concat(),
            CellSource::Text(text) => text.clone(),
        }
    }
}

impl Notebook {
    // Reads and parses a notebook from disk
    //
    // Errors carry the path so the caller can log and skip the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(path, &content)
    }

    pub fn from_json(path: &Path, content: &str) -> Result<Self> {
        let file: NotebookFile = serde_json::from_str(content)
            .with_context(|| format!("{} is not a valid notebook", path.display()))?;

        Ok(Notebook {
            path: path.to_path_buf(),
            cells: file.cells,
        })
    }

    /// (cell index, text) for every markdown cell, in notebook order
    ///
    /// The index counts all cells, not just markdown ones, so it matches what
    /// a reader sees when opening the notebook.
    pub fn markdown_cells(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_markdown())
            .map(|(index, cell)| (index, cell.text()))
    }
}
