mod advisor;
mod dataset;
mod models;
mod predictor;

use advisor::{branch_preference_note, AdmissionAdvisor};
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use models::{CandidateQuery, Config, PredictedCollege, ALL_BRANCHES};
use predictor::CollegePredictor;
use std::fs;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("eapcet-predictor")
        .version("1.0")
        .about("Predicts qualifying engineering colleges from TGEAPCET cutoff ranks")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("rank")
                .short('r')
                .long("rank")
                .value_name("RANK")
                .help("Candidate's TGEAPCET rank")
                .required(true),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .value_name("CATEGORY")
                .help("Reservation category (OC, BC_A..BC_E, SC, ST, EWS)")
                .required(true),
        )
        .arg(
            Arg::new("gender")
                .short('g')
                .long("gender")
                .value_name("GENDER")
                .help("Candidate's gender (BOYS or GIRLS)")
                .required(true),
        )
        .arg(
            Arg::new("branch")
                .short('b')
                .long("branch")
                .value_name("BRANCH")
                .help("Desired branch name; repeat for several, or pass ALL for any branch")
                .action(ArgAction::Append)
                .default_value(ALL_BRANCHES),
        )
        .arg(
            Arg::new("colleges")
                .short('n')
                .long("colleges")
                .value_name("COUNT")
                .help("How many colleges to list (1-50, default 20)"),
        )
        .arg(
            Arg::new("preferences")
                .short('p')
                .long("preferences")
                .value_name("TEXT")
                .help("Free-text preferences for the suitability summary")
                .default_value(""),
        )
        .get_matches();

    let config_file = matches.get_one::<String>("config").unwrap();

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        println!("📋 Loading configuration from: {}", config_file);
        Config::load_from_file(config_file)?
    } else {
        println!("📝 Creating default configuration file: {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        println!(
            "⚠️  Please edit {} and point dataset_path at the last-rank statement JSON, then run the program again.",
            config_file
        );
        return Ok(());
    };

    let rank: u32 = match matches.get_one::<String>("rank").unwrap().parse() {
        Ok(rank) if rank > 0 => rank,
        _ => {
            println!("❌ Error: rank must be a positive integer");
            return Ok(());
        }
    };

    let query = CandidateQuery {
        rank,
        category: matches.get_one::<String>("category").unwrap().clone(),
        gender: matches.get_one::<String>("gender").unwrap().clone(),
        branches: matches
            .get_many::<String>("branch")
            .unwrap()
            .cloned()
            .collect(),
        limit: matches
            .get_one::<String>("colleges")
            .and_then(|n| n.parse::<usize>().ok()),
        preferences: matches.get_one::<String>("preferences").unwrap().clone(),
    };

    println!("🔍 Predicting colleges for rank {} ({} / {})", query.rank, query.category, query.gender);
    let any_branch = query.branches.iter().any(|b| b == ALL_BRANCHES);
    if any_branch {
        println!("🎓 Branches of interest: ALL BRANCHES");
    } else {
        println!("🎓 Branches of interest: {}", query.branches.join(", "));
    }

    // Load the dataset once; it is read-only for the rest of the run
    println!("📂 Reading dataset from: {}", config.dataset_path);
    let (records, stats) = dataset::load_dataset(&config.dataset_path)?;
    println!(
        "   ✅ {} college rows ({} header, {} disclaimer, {} malformed rows skipped)",
        stats.rows, stats.headers, stats.disclaimers, stats.malformed
    );

    let predictor = CollegePredictor::with_rank_window(&records, config.rank_window);
    let colleges = match predictor.predict(&query) {
        Ok(colleges) => colleges,
        Err(e) => {
            println!("❌ An unexpected error occurred. Please try again.");
            println!("   ({})", e);
            return Ok(());
        }
    };

    if colleges.is_empty() {
        println!("😔 No suitable colleges found matching your criteria. Please try different options.");
        return Ok(());
    }

    print_colleges(&colleges);

    if let Some(output_dir) = &config.output_directory {
        fs::create_dir_all(output_dir)?;
        generate_prediction_csv(&colleges, output_dir)?;
        println!("📄 Report written to: {}/predicted_colleges.csv", output_dir);
    }

    // Narratives are best-effort extras; failures are reported and dropped
    if let Some(advisor_config) = config.advisor.clone() {
        println!("\n🤖 Generating admission narratives...");
        let advisor = AdmissionAdvisor::new(advisor_config);
        let top_college = &colleges[0];
        let branch_note = branch_preference_note(&query.branches, any_branch);

        let (analysis, summary) = tokio::join!(
            advisor.analyze_rank_trend(&query.category, &query.gender, &top_college.branch_name),
            advisor.summarize_college(top_college, &query.preferences, &branch_note),
        );

        match analysis {
            Ok(text) => println!("\n📈 Rank trend analysis:\n{}", text),
            Err(e) => println!("   ⚠️  Rank trend analysis unavailable: {}", e),
        }
        match summary {
            Ok(text) => println!("\n📝 Suitability summary for {}:\n{}", top_college.college_name, text),
            Err(e) => println!("   ⚠️  Suitability summary unavailable: {}", e),
        }
    }

    println!("\n✅ Prediction complete!");
    Ok(())
}

fn print_colleges(colleges: &[PredictedCollege]) {
    println!("\n🏫 {} qualifying college(s), tightest fit first:", colleges.len());
    for (i, college) in colleges.iter().enumerate() {
        println!(
            "   {}. [{}] {} - {}",
            i + 1,
            college.inst_code,
            college.college_name,
            college.branch_name
        );
        println!(
            "      Cutoff ({}): {} | Fee: {} | {}, {}",
            college.rank_category_used,
            college.cutoff_display,
            college.tuition_fee,
            college.place,
            college.district
        );
    }
}

fn generate_prediction_csv(colleges: &[PredictedCollege], output_dir: &str) -> Result<()> {
    use csv::Writer;

    let csv_path = Path::new(output_dir).join("predicted_colleges.csv");
    let mut writer = Writer::from_path(csv_path)?;

    // Write headers
    writer.write_record([
        "Inst_Code",
        "College_Name",
        "Branch",
        "Cutoff_Rank",
        "Cutoff_Display",
        "Tuition_Fee",
        "Place",
        "District",
        "Rank_Column",
    ])?;

    // Write data
    for college in colleges {
        writer.write_record([
            &college.inst_code,
            &college.college_name,
            &college.branch_name,
            &college.cutoff_rank.to_string(),
            &college.cutoff_display,
            &college.tuition_fee,
            &college.place,
            &college.district,
            &college.rank_category_used,
        ])?;
    }

    writer.flush()?;
    Ok(())
}
