mod transport;

use std::error::Error;
use std::io::Read;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zhconvert_core::{
    BodyEncoding, ClientConfig, ConvertOptions, ConverterType, ReplaceType, ZhConverter,
};

use crate::transport::UreqTransport;

#[derive(Parser, Debug)]
#[command(name = "zhconvert-demo")]
#[command(about = "Convert Chinese text between regional variants through the zhconvert API")]
#[command(version)]
struct Cli {
    /// Text to convert; read from stdin when omitted
    text: Option<String>,

    /// Target converters, comma separated
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values_t = [ConverterType::China, ConverterType::Hongkong]
    )]
    to: Vec<ConverterType>,

    /// API base URL
    #[arg(long, env = "ZHCONVERT_BASE_URL")]
    base_url: Option<String>,

    /// Send a form-encoded body instead of JSON
    #[arg(long)]
    form: bool,

    /// Replacement applied before conversion, as FROM=TO (repeatable)
    #[arg(long = "pre", value_parser = parse_pair)]
    pre: Vec<(String, String)>,

    /// Replacement applied after conversion, as FROM=TO (repeatable)
    #[arg(long = "post", value_parser = parse_pair)]
    post: Vec<(String, String)>,

    /// Term to leave untouched (repeatable)
    #[arg(long = "protect")]
    protect: Vec<String>,

    /// Print the raw service-info response and exit
    #[arg(long)]
    service_info: bool,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .ok_or_else(|| format!("expected FROM=TO, got {raw:?}"))
}

impl Cli {
    fn config(&self) -> Result<ClientConfig, Box<dyn Error>> {
        let mut config = ClientConfig::from_env()?;
        if let Some(url) = &self.base_url {
            config.base_url = ClientConfig::new(url)?.base_url;
        }
        if self.form {
            config.body_encoding = BodyEncoding::Form;
        }
        Ok(config)
    }

    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new();
        if !self.pre.is_empty() {
            options = options.replace(ReplaceType::UserPreReplace(self.pre.clone()));
        }
        if !self.post.is_empty() {
            options = options.replace(ReplaceType::UserPostReplace(self.post.clone()));
        }
        if !self.protect.is_empty() {
            let terms = self.protect.iter().map(|t| (t.clone(), String::new())).collect();
            options = options.replace(ReplaceType::UserProtectReplace(terms));
        }
        options
    }

    fn input_text(&self) -> Result<String, std::io::Error> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf.trim_end_matches('\n').to_string())
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    tracing::info!(base_url = %config.base_url, encoding = ?config.body_encoding, "using zhconvert");
    let converter = ZhConverter::new(config, UreqTransport::new());

    if cli.service_info {
        let body = converter.service_info().await?;
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let text = cli.input_text()?;
    let options = cli.options();
    for target in &cli.to {
        // One line per target; a failed target does not stop the rest.
        match converter.convert_text(&text, *target, &options).await {
            Ok(converted) => println!("{target}: {converted}"),
            Err(err) => println!("{target}: {err}"),
        }
    }
    Ok(())
}
