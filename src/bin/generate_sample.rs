//! Writes a deterministic synthetic observation table for demos:
//!
//! ```text
//! cargo run --bin generate_sample -- [output.csv]
//! ```

use anyhow::{Context, Result};

const HEADER: [&str; 20] = [
    "Admin_Unit_Code",
    "Plot_Name",
    "Location_Type",
    "Year",
    "Date",
    "Start_Time",
    "Observer",
    "Interval_Length",
    "ID_Method",
    "Distance",
    "Flyover_Observed",
    "Sex",
    "Scientific_Name",
    "AOU_Code",
    "PIF_Watchlist_Status",
    "Temperature",
    "Humidity",
    "Disturbance",
    "Count",
    "Season",
];

/// (scientific name, AOU code, on the PIF watchlist)
const SPECIES: [(&str, &str, bool); 12] = [
    ("Turdus migratorius", "AMRO", false),
    ("Cardinalis cardinalis", "NOCA", false),
    ("Sitta carolinensis", "WBNU", false),
    ("Hylocichla mustelina", "WOTH", true),
    ("Setophaga cerulea", "CERW", true),
    ("Baeolophus bicolor", "TUTI", false),
    ("Vireo olivaceus", "REVI", false),
    ("Melospiza melodia", "SOSP", false),
    ("Spizella pusilla", "FISP", false),
    ("Cyanocitta cristata", "BLJA", false),
    ("Piranga olivacea", "SCTA", false),
    ("Helmitheros vermivorum", "WEWA", true),
];

const LOCATIONS: [&str; 2] = ["Forest", "Grassland"];
const OBSERVERS: [&str; 5] = ["Elizabeth Oswald", "Kimberly Serno", "Brian Swimelar", "Sam Roberts", "Dana Lee"];
const ID_METHODS: [&str; 3] = ["Singing", "Calling", "Visualization"];
const SEXES: [&str; 3] = ["Undetermined", "Male", "Female"];
const DISTURBANCES: [&str; 4] = [
    "No effect on count",
    "Slight effect on count",
    "Moderate effect on count",
    "Serious effect on count",
];
const SEASONS: [(&str, u32); 4] = [("Spring", 4), ("Summer", 6), ("Autumn", 9), ("Winter", 12)];

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
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Cleaned_Bird_Observation_Data.csv".to_string());
    let mut rng = SimpleRng::new(42);
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    let mut rows = 0;
    for year in [2018, 2019, 2020, 2021] {
        for &(season, month) in &SEASONS {
            for plot in 0..12 {
                let location = LOCATIONS[plot % LOCATIONS.len()];
                let plot_name = format!("{}-{:04}", &location[..4].to_uppercase(), plot + 1);
                let observer = *rng.pick(&OBSERVERS);
                let day = 1 + rng.below(28);
                let hour = 5 + rng.below(6);
                let minute = rng.below(60);
                let base_temp = match season {
                    "Summer" => 27.0,
                    "Winter" => 4.0,
                    _ => 17.0,
                };
                let temperature = rng.gauss(base_temp, 3.0);
                let humidity = rng.gauss(70.0, 12.0).clamp(20.0, 100.0);

                for interval in 1..=4 {
                    let sightings = 1 + rng.below(4);
                    for _ in 0..sightings {
                        let (name, aou, watch) = *rng.pick(&SPECIES);
                        // A few unparsable distances exercise the missing-value path.
                        let distance = if rng.next_f64() < 0.1 {
                            "<= 50 Meters".to_string()
                        } else {
                            format!("{:.0}", rng.gauss(45.0, 20.0).abs())
                        };
                        writer.write_record([
                            "ANTI".to_string(),
                            plot_name.clone(),
                            location.to_string(),
                            year.to_string(),
                            format!("{year}-{month:02}-{day:02}"),
                            format!("{hour}:{minute:02}:00"),
                            observer.to_string(),
                            format!("{:.1}", interval as f64 * 2.5),
                            rng.pick(&ID_METHODS).to_string(),
                            distance,
                            (rng.next_f64() < 0.05).to_string().to_uppercase(),
                            rng.pick(&SEXES).to_string(),
                            name.to_string(),
                            aou.to_string(),
                            watch.to_string().to_uppercase(),
                            format!("{temperature:.1}"),
                            format!("{humidity:.1}"),
                            rng.pick(&DISTURBANCES).to_string(),
                            (1 + rng.below(3)).to_string(),
                            season.to_string(),
                        ])?;
                        rows += 1;
                    }
                }
            }
        }
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {rows} observations to {output_path}");
    Ok(())
}
