use super::{Map, MapArchive};
use crate::bit_vector::{BitVector, Generator};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::io;

/// 置换：y[i] = x[σ(i)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permutation {
    permutation: Vec<usize>,
}

impl Permutation {
    /// σ 必须是 {0, ..., n-1} 上的双射
    pub fn new(permutation: Vec<usize>) -> Self {
        assert!(is_permutation(&permutation), "不是合法的置换");
        Self { permutation }
    }

    pub fn random(n: usize, rng: &mut Generator) -> Self {
        let mut permutation: Vec<usize> = (0..n).collect();
        permutation.shuffle(rng);
        Self { permutation }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.permutation
    }

    /// 逆置换
    pub fn inverse(&self) -> Permutation {
        let mut inverse = vec![0; self.permutation.len()];
        for (i, &j) in self.permutation.iter().enumerate() {
            inverse[j] = i;
        }
        Permutation {
            permutation: inverse,
        }
    }
}

pub(crate) fn is_permutation(permutation: &[usize]) -> bool {
    let mut seen = vec![false; permutation.len()];
    for &i in permutation {
        if i >= seen.len() || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

impl Map for Permutation {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        assert_eq!(input.len(), self.permutation.len());
        assert_eq!(output.len(), self.permutation.len());
        for (i, &j) in self.permutation.iter().enumerate() {
            output.set(i, input[j]);
        }
    }

    fn input_size(&self) -> usize {
        self.permutation.len()
    }

    fn output_size(&self) -> usize {
        self.permutation.len()
    }

    fn is_surjective(&self) -> bool {
        true
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "Permutation: {}", self.permutation.iter().join(" "))
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Permutation(self.clone())
    }
}
