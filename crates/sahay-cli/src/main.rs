//! Sahay CLI: run the borrower and lender agents from a terminal.
//!
//! Usage:
//!   sahay chat "What is a self-help group?" [--lender]
//!   sahay explain --score 67 --risk Medium [--lang hindi] [--profile profile.json]
//!   sahay tips Kharif [--profile profile.json] [--lang kannada]
//!   sahay voice query.wav [--lang auto]
//!   sahay ask "How much interest for an agriculture loan?" [--lang hindi]
//!   sahay score --profile profile.json [--model]
//!   sahay terms --amount 100000 --type agriculture [--profile profile.json] [--lang kannada]
//!   sahay init [--config FILE] [--force]
//!
//! Reads `.env` and an optional `sahay.toml` (`--config FILE`); the environment wins.
//! `init` writes a starter `sahay.toml` without the credential.

use sahay_core::config::FileConfig;
use sahay_core::knowledge::create_knowledge_base;
use sahay_core::{
    Audience, CreditResult, CreditScoringAgent, Dispatcher, EducationalContentAgent, Language,
    LanguageMode, LoanRequest, LoanRiskAdvisor, LoanType, RagChat, SahayConfig, ScoringMethod,
    UserProfile,
};
use sahay_voice::{ConversationOutcome, SpeechCapabilities, VoiceAssistant};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Positional arguments plus `--flag value` / `--switch` options.
#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    options: HashMap<String, String>,
    switches: Vec<String>,
}

const SWITCHES: [&str; 3] = ["--lender", "--model", "--force"];

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> Self {
        let mut args = Args::default();
        while let Some(a) = raw.next() {
            if SWITCHES.contains(&a.as_str()) {
                args.switches.push(a);
            } else if a.starts_with("--") {
                let value = raw.next().unwrap_or_default();
                args.options.insert(a, value);
            } else {
                args.positional.push(a);
            }
        }
        args
    }

    fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    fn language(&self) -> Language {
        self.option("--lang")
            .map(Language::from_name)
            .unwrap_or_default()
    }

    /// Positional text joined with spaces, so unquoted questions work.
    fn text(&self) -> String {
        self.positional.join(" ")
    }
}

fn usage() {
    eprintln!("Sahay: rural microfinance assistant");
    eprintln!("  chat <question> [--lender]                 Knowledge-base chat (borrower or lender)");
    eprintln!("  explain --score N --risk LEVEL [--lang L]  Explain a credit score in simple words");
    eprintln!("  tips <season> [--profile FILE] [--lang L]  Seasonal money tips");
    eprintln!("  voice <audio> [--lang auto|L]              Transcribe, answer, and speak");
    eprintln!("  ask <text> [--lang L]                      Answer a question as the voice assistant");
    eprintln!("  score --profile FILE [--model]             Credit score (rules, or the model)");
    eprintln!("  terms --amount N --type T [--profile FILE] Loan risk and terms with EMI");
    eprintln!("  init [--force]                             Write a starter config file");
    eprintln!();
    eprintln!("Options: --config FILE (default sahay.toml), --profile FILE (profile JSON)");
    eprintln!("Loan types: agriculture, micro_business, personal, housing, education.");
    eprintln!("Requires SAHAY_LLM_API_KEY or GROQ_API_KEY. Languages: english, hindi, kannada.");
}

fn load_profile(path: Option<&str>) -> CliResult<UserProfile> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)?;
            let profile: UserProfile = serde_json::from_str(&content)?;
            Ok(profile.validated())
        }
        None => Ok(UserProfile::empty_template()),
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut raw = std::env::args().skip(1);
    let Some(command) = raw.next() else {
        usage();
        return Ok(());
    };
    let args = Args::parse(raw);

    let config_path = PathBuf::from(args.option("--config").unwrap_or("sahay.toml"));
    if command == "init" {
        init_config(&config_path, args.switch("--force"))?;
        println!("Wrote {}; set SAHAY_LLM_API_KEY or add api_key.", config_path.display());
        return Ok(());
    }
    let config = SahayConfig::load(&config_path)?;
    info!(model = %config.model, url = %config.api_base_url, "Sahay: configuration loaded");

    match command.as_str() {
        "chat" => chat(&config, &args).await,
        "explain" => explain(&config, &args).await,
        "tips" => tips(&config, &args).await,
        "voice" => voice(&config, &args).await,
        "ask" => ask(&config, &args).await,
        "score" => score(&config, &args).await,
        "terms" => terms(&config, &args).await,
        _ => {
            usage();
            Ok(())
        }
    }
}

async fn chat(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let audience = if args.switch("--lender") {
        Audience::Lender
    } else {
        Audience::Borrower
    };
    let mut rag = RagChat::new(
        Dispatcher::from_config(config),
        create_knowledge_base(config),
        config.history_capacity,
    );
    let question = args.text();
    if question.trim().is_empty() {
        println!("Try asking:");
        for q in RagChat::suggested_questions(audience) {
            println!("  - {}", q);
        }
        return Ok(());
    }
    println!("{}", rag.get_response(&question, audience).await);
    Ok(())
}

async fn explain(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let score: f64 = args
        .option("--score")
        .ok_or("explain requires --score")?
        .parse()?;
    let risk = args.option("--risk").unwrap_or("Unknown");
    let profile = load_profile(args.option("--profile"))?;
    let mut agent = EducationalContentAgent::new(Dispatcher::from_config(config), config.cache_capacity);
    let text = agent
        .explain_credit_score(&CreditResult::new(score, risk), &profile, args.language())
        .await;
    println!("{}", text);
    Ok(())
}

async fn tips(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let season = args.text();
    let season = if season.trim().is_empty() {
        "current"
    } else {
        season.as_str()
    };
    let profile = load_profile(args.option("--profile"))?;
    let agent = EducationalContentAgent::new(Dispatcher::from_config(config), config.cache_capacity);
    let tips = agent
        .generate_seasonal_financial_tips(&profile, season, args.language())
        .await;
    for (i, tip) in tips.iter().enumerate() {
        println!("{}. {}", i + 1, tip);
    }
    Ok(())
}

async fn voice(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let audio = args.positional.first().ok_or("voice requires an audio file")?;
    let mode = LanguageMode::from_name(args.option("--lang").unwrap_or("auto"));
    let mut assistant = VoiceAssistant::from_config(config, SpeechCapabilities::from_env());
    let outcome = assistant
        .handle_voice_conversation(Path::new(audio), "", mode)
        .await;
    match &outcome {
        ConversationOutcome::Completed(done) => {
            println!("You: {}", done.transcription.text);
            println!("Sahay: {}", done.reply.response_text);
            if let Some(path) = &done.speech.audio_path {
                println!("Audio: {}", path.display());
            }
        }
        ConversationOutcome::Failed(failure) => {
            eprintln!("Voice conversation stopped at {}: {}", failure.stage, failure.error);
        }
    }
    Ok(())
}

async fn ask(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let question = args.text();
    if question.trim().is_empty() {
        return Err("ask requires a question".into());
    }
    let mut assistant = VoiceAssistant::from_config(config, SpeechCapabilities::none());
    let result = assistant
        .process_voice_query(&question, None, "", args.language())
        .await;
    println!("{}", result.response_text);
    Ok(())
}

/// Write the starter config; an existing file is kept unless `force`.
fn init_config(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(format!("{} already exists; pass --force to overwrite", path.display()).into());
    }
    FileConfig::starter().save_to_path(path)?;
    info!(path = %path.display(), "starter configuration written");
    Ok(())
}

async fn score(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let path = args.option("--profile").ok_or("score requires --profile")?;
    let profile = load_profile(Some(path))?;
    let method = if args.switch("--model") {
        ScoringMethod::ModelBacked
    } else {
        ScoringMethod::RuleBased
    };
    let mut agent = CreditScoringAgent::new(Dispatcher::from_config(config), config.cache_capacity);
    let assessment = agent
        .calculate_credit_score(&profile, method, args.language())
        .await;
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

async fn terms(config: &SahayConfig, args: &Args) -> CliResult<()> {
    let amount: f64 = args
        .option("--amount")
        .ok_or("terms requires --amount")?
        .parse()?;
    let loan_type = LoanType::from_name(args.option("--type").unwrap_or("personal"));
    let profile = load_profile(args.option("--profile"))?;
    let request = LoanRequest::new(amount, loan_type);

    let mut advisor = LoanRiskAdvisor::new(Dispatcher::from_config(config), config.cache_capacity);
    let assessment = LoanRiskAdvisor::assess_loan_risk(&profile, &request);
    let terms = advisor
        .recommend_loan_terms(&assessment, args.language())
        .await;
    println!(
        "{} ({:.1}): {}",
        assessment.risk_category, assessment.overall_risk_score, assessment.approval_recommendation
    );
    println!(
        "Amount {:.0} at {}% for {} months, EMI {:.2}, fee {:.2}",
        terms.recommended_amount,
        terms.interest_rate,
        terms.tenure_months,
        terms.monthly_emi,
        terms.processing_fee
    );
    println!("{}", terms.terms_explanation);
    Ok(())
}
