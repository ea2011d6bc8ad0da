use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

const STATES: [&str; 10] = ["AL", "CA", "FL", "GA", "IL", "NY", "OH", "PA", "TX", "WA"];
const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const PARTY: [&str; 7] = [
    "Strong Democrat",
    "Weak Democrat",
    "Independent Democrat",
    "Independent",
    "Independent Republican",
    "Weak Republican",
    "Strong Republican",
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // Column names follow the survey's cumulative-file convention.
    let mut year = Vec::new();
    let mut case_id = Vec::new();
    let mut age: Vec<Option<i64>> = Vec::new();
    let mut gender = Vec::new();
    let mut state = Vec::new();
    let mut party = Vec::new();
    let mut weight = Vec::new();
    let mut voted = Vec::new();

    let mut id: i64 = 1;
    for wave in (1952..=2020).step_by(4) {
        for _ in 0..25 {
            year.push(wave as i64);
            case_id.push(id);
            // roughly 5% of respondents refuse to give an age
            age.push(if rng.next_f64() < 0.05 {
                None
            } else {
                Some(18 + rng.below(73) as i64)
            });
            gender.push(rng.pick(&GENDERS));
            state.push(rng.pick(&STATES));
            party.push(rng.pick(&PARTY));
            weight.push(((0.5 + rng.next_f64() * 1.5) * 1000.0).round() / 1000.0);
            voted.push(rng.next_f64() < 0.62);
            id += 1;
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("VCF0004", DataType::Int64, false),
        Field::new("VCF0006", DataType::Int64, false),
        Field::new("VCF0101", DataType::Int64, true),
        Field::new("VCF0104", DataType::Utf8, false),
        Field::new("VCF0901b", DataType::Utf8, false),
        Field::new("VCF0301", DataType::Utf8, false),
        Field::new("VCF0009z", DataType::Float64, false),
        Field::new("VCF0702", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(year)),
            Arc::new(Int64Array::from(case_id)),
            Arc::new(Int64Array::from(age)),
            Arc::new(StringArray::from(gender)),
            Arc::new(StringArray::from(state)),
            Arc::new(StringArray::from(party)),
            Arc::new(Float64Array::from(weight)),
            Arc::new(BooleanArray::from(voted)),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let parquet_path = "survey_data.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    // Write CSV (the application's default source)
    let csv_path = "survey_data.csv";
    let file = std::fs::File::create(csv_path).context("creating CSV output")?;
    let mut csv_writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(file);
    csv_writer.write(&batch).context("writing CSV")?;

    println!(
        "Wrote {} respondents x {} columns to {csv_path} and {parquet_path}",
        batch.num_rows(),
        batch.num_columns()
    );
    Ok(())
}
