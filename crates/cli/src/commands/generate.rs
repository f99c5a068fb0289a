//! `finaid generate-data`: write a synthetic student population.

use std::path::{Path, PathBuf};

use finaid_config::AppConfig;
use finaid_records::synthetic;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{CmdResult, load_config};

pub async fn run(config: Option<&Path>, count: usize, out: Option<PathBuf>, seed: Option<u64>) -> CmdResult {
    let dir = match out {
        Some(dir) => dir,
        None => {
            let config = load_config(config)?;
            config
                .data
                .students_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(AppConfig::data_dir)
        }
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let students = synthetic::generate_students(count, &mut rng);
    let files = synthetic::write_population(&dir, &students)?;

    println!("Generated {count} students");
    println!("   {}", files.students.display());
    println!("   {}", files.determinations.display());
    if let Some(sample) = students.first() {
        println!("   e.g. finaid student {}", sample.student_id);
    }

    Ok(())
}
