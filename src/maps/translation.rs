use super::{Map, MapArchive};
use crate::bit_vector::{BitVector, Generator};
use serde::{Deserialize, Serialize};
use std::io;

/// 平移：y = x + b，自身就是自己的逆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Translation {
    bv: BitVector,
}

impl Translation {
    pub fn new(bv: BitVector) -> Self {
        Self { bv }
    }

    pub fn random(n: usize, rng: &mut Generator) -> Self {
        Self {
            bv: BitVector::random(n, rng),
        }
    }

    pub fn vector(&self) -> &BitVector {
        &self.bv
    }
}

impl Map for Translation {
    fn map_into(&self, input: &BitVector, output: &mut BitVector) {
        assert_eq!(input.len(), self.bv.len());
        output.clone_from(input);
        output.add_assign(&self.bv);
    }

    fn input_size(&self) -> usize {
        self.bv.len()
    }

    fn output_size(&self) -> usize {
        self.bv.len()
    }

    fn is_surjective(&self) -> bool {
        true
    }

    fn display(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        writeln!(sink, "Translation: {}", self.bv)
    }

    fn to_archive(&self) -> MapArchive {
        MapArchive::Translation(self.clone())
    }
}
