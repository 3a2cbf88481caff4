//! Synthetic corpus generation: record lines of the shape
//! `<surname> <given> <patronymic> <brand> <model> <HH:MM> <line_no>`.
//!
//! The RNG is injected by the caller; a fixed seed reproduces the corpus
//! byte for byte.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const SURNAMES: &[&str] = &[
    "Voloshinskiy",
    "Ivanov",
    "Petrov",
    "Sidorov",
    "Komarov",
    "Lebedev",
    "Smirnov",
    "Morozov",
    "Novikov",
    "Popov",
];

const GIVEN_NAMES: &[&str] = &[
    "Rostislav",
    "Artem",
    "Daniil",
    "Vadim",
    "Oleg",
    "Yuri",
    "Alexey",
    "Nikita",
    "Kirill",
    "Vladislav",
];

const PATRONYMICS: &[&str] = &[
    "Anatolevich",
    "Ivanovich",
    "Petrovich",
    "Nikolaevich",
    "Sergeevich",
    "Alexeevich",
    "Yurievich",
    "Andreevich",
];

const BRANDS: &[&str] = &[
    "Toyota",
    "BMW",
    "Mercedes",
    "Lada",
    "Ford",
    "Audi",
    "Hyundai",
    "Kia",
    "Mazda",
    "Volkswagen",
];

const MODELS: &[&str] = &[
    "Camry",
    "X5",
    "E200",
    "Granta",
    "Focus",
    "A4",
    "Solaris",
    "Rio",
    "CX-5",
    "Polo",
    "Passat",
];

fn pick<'a>(rng: &mut impl Rng, pool: &[&'a str]) -> &'a str {
    pool[rng.random_range(0..pool.len())]
}

/// One record line; the line number doubles as the record id, which keeps
/// every generated key distinct.
pub fn generate_record(rng: &mut impl Rng, line_number: usize) -> String {
    format!(
        "{} {} {} {} {} {:02}:{:02} {}",
        pick(rng, SURNAMES),
        pick(rng, GIVEN_NAMES),
        pick(rng, PATRONYMICS),
        pick(rng, BRANDS),
        pick(rng, MODELS),
        rng.random_range(0u8..24),
        rng.random_range(0u8..60),
        line_number
    )
}

/// A whole corpus from an explicit seed.
pub fn generate_corpus(seed: u64, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=count).map(|n| generate_record(&mut rng, n)).collect()
}

/// Write a corpus file, one record per line.
pub fn write_corpus(path: impl AsRef<Path>, seed: u64, count: usize) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in generate_corpus(seed, count) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}
