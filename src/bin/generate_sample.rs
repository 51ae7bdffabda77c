use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const TRACKS: usize = 2_000;

/// Genre families with their characteristic (danceability, energy,
/// acousticness, tempo, popularity) centres.
const FAMILIES: [(&[&str], [f64; 5]); 6] = [
    (&["pop", "dance pop", "post-teen pop"], [0.70, 0.70, 0.15, 118.0, 62.0]),
    (&["rock", "classic rock", "album rock"], [0.50, 0.80, 0.10, 126.0, 48.0]),
    (&["hip hop", "rap", "trap"], [0.78, 0.65, 0.12, 96.0, 58.0]),
    (&["jazz", "cool jazz", "bebop"], [0.52, 0.35, 0.70, 110.0, 30.0]),
    (&["classical", "early romantic era"], [0.28, 0.15, 0.92, 92.0, 22.0]),
    (&["edm", "electro house", "big room"], [0.66, 0.88, 0.04, 128.0, 55.0]),
];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn unit(&mut self, mean: f64, std_dev: f64) -> f64 {
        self.gauss(mean, std_dev).clamp(0.0, 1.0)
    }
}

/// Python-style list literal, the format the loader's genre parser expects.
fn genre_list(tags: &[&str]) -> String {
    let quoted: Vec<String> = tags.iter().map(|t| format!("'{t}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[derive(Default)]
struct Columns {
    artists: Vec<String>,
    genres: Vec<String>,
    popularity: Vec<f64>,
    danceability: Vec<f64>,
    energy: Vec<f64>,
    valence: Vec<f64>,
    acousticness: Vec<f64>,
    instrumentalness: Vec<f64>,
    liveness: Vec<f64>,
    loudness: Vec<f64>,
    speechiness: Vec<f64>,
    tempo: Vec<f64>,
    duration_ms: Vec<f64>,
    key: Vec<i64>,
    mode: Vec<i64>,
    count: Vec<i64>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut c = Columns::default();
    for i in 0..TRACKS {
        let (tags, [dance, energy, acoustic, tempo, popularity]) = FAMILIES[rng.below(FAMILIES.len())];
        let n_tags = 1 + rng.below(tags.len());
        // Roughly one track in fifty has no genre tags at all.
        let genres = if rng.below(50) == 0 { "[]".to_string() } else { genre_list(&tags[..n_tags]) };

        c.artists.push(format!("Artist {:03}", i % 240));
        c.genres.push(genres);
        c.popularity.push(rng.gauss(popularity, 15.0).clamp(0.0, 100.0).round());
        c.danceability.push(rng.unit(dance, 0.12));
        c.energy.push(rng.unit(energy, 0.12));
        c.valence.push(rng.unit(0.5, 0.22));
        c.acousticness.push(rng.unit(acoustic, 0.12));
        c.instrumentalness.push(rng.unit(acoustic * 0.4, 0.15));
        c.liveness.push(rng.unit(0.18, 0.1));
        c.loudness.push(rng.gauss(-18.0 + energy * 14.0, 2.5).min(0.0));
        c.speechiness.push(rng.unit(0.07, 0.05));
        c.tempo.push(rng.gauss(tempo, 14.0).clamp(40.0, 220.0));
        c.duration_ms.push(rng.gauss(215_000.0, 45_000.0).clamp(30_000.0, 900_000.0).round());
        c.key.push(rng.below(12) as i64);
        c.mode.push(rng.below(2) as i64);
        c.count.push(1 + rng.below(40) as i64);
    }
    c
}

fn text(values: &[String]) -> ArrayRef {
    Arc::new(StringArray::from(values.iter().map(String::as_str).collect::<Vec<_>>()))
}

fn float(values: Vec<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

fn int(values: Vec<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values))
}

fn main() -> anyhow::Result<()> {
    let output_path = std::env::args().nth(1).unwrap_or_else(|| "sample_tracks.parquet".to_string());
    let mut rng = SimpleRng::new(42);
    let c = generate(&mut rng);

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("artists", text(&c.artists)),
        ("genres", text(&c.genres)),
        ("popularity", float(c.popularity)),
        ("danceability", float(c.danceability)),
        ("energy", float(c.energy)),
        ("valence", float(c.valence)),
        ("acousticness", float(c.acousticness)),
        ("instrumentalness", float(c.instrumentalness)),
        ("liveness", float(c.liveness)),
        ("loudness", float(c.loudness)),
        ("speechiness", float(c.speechiness)),
        ("tempo", float(c.tempo)),
        ("duration_ms", float(c.duration_ms)),
        ("key", int(c.key)),
        ("mode", int(c.mode)),
        ("count", int(c.count)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, a)| a).collect())
        .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(&output_path).with_context(|| format!("Failed to create {output_path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;

    println!("Wrote {TRACKS} tracks to {output_path}");
    Ok(())
}
