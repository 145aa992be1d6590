//! CTC-style sequence decoding for text recognition outputs.
//!
//! A recognition model emits a `[timesteps, alphabet + 1]` probability
//! matrix; the extra column is the blank symbol. Greedy decoding takes
//! the argmax path, collapses repeated symbols into runs and drops
//! blanks. Each emitted character carries the mean probability of its
//! run; the word score is the weakest character.

use ndarray::ArrayView2;

use crate::domain::result::RecognizedText;

/// Greedy CTC decoder for one recognition alphabet.
#[derive(Debug, Clone)]
pub struct CtcLabelDecode {
    alphabet: Vec<char>,
}

impl CtcLabelDecode {
    pub fn new(vocabulary: &str) -> Self {
        Self {
            alphabet: vocabulary.chars().collect(),
        }
    }

    /// Index of the implicit blank symbol.
    fn blank(&self) -> usize {
        self.alphabet.len()
    }

    /// Decodes one probability matrix.
    ///
    /// The result's `is_accepted` is left false; acceptance is decided
    /// by the caller against the model threshold and field format.
    pub fn decode(&self, probs: ArrayView2<f32>) -> RecognizedText {
        let timesteps = probs.nrows();
        if timesteps == 0 {
            return RecognizedText::empty();
        }

        // Argmax path.
        let path: Vec<(usize, f32)> = probs
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = (0usize, f32::NEG_INFINITY);
                for (index, &p) in row.iter().enumerate() {
                    if p > best.1 {
                        best = (index, p);
                    }
                }
                best
            })
            .collect();

        let mut text = String::new();
        let mut symbol_scores = Vec::new();
        let mut run_start = 0usize;
        for index in 0..timesteps {
            let run_ends = index + 1 == timesteps || path[index].0 != path[index + 1].0;
            if !run_ends {
                continue;
            }
            let symbol = path[index].0;
            if symbol != self.blank() {
                if let Some(&ch) = self.alphabet.get(symbol) {
                    let run = &path[run_start..=index];
                    let mean = run.iter().map(|&(_, p)| p).sum::<f32>() / run.len() as f32;
                    text.push(ch);
                    symbol_scores.push(mean);
                }
            }
            run_start = index + 1;
        }

        if text.is_empty() {
            return RecognizedText::empty();
        }
        let word_score = symbol_scores.iter().copied().fold(f32::INFINITY, f32::min);
        RecognizedText {
            text,
            symbol_scores,
            word_score,
            is_accepted: false,
        }
    }
}
