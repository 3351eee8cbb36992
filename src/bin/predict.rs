use std::{
    ffi::OsStr,
    fs::{create_dir, read_dir},
    path::PathBuf,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use futures::future::try_join_all;
use segview::{client::DEFAULT_RETRIES, codec, Config, PredictClient};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt, BufReader},
};
use tracing::Level;

#[derive(Parser, Debug)]
struct Args {
    /// A PNG image, or a directory of them.
    #[arg(short, long)]
    input: PathBuf,

    /// Where the predicted mask(s) go; a file for a single image, a
    /// directory for a batch.
    #[arg(short, long)]
    output: PathBuf,

    /// Prediction endpoint; overrides the API_URL environment variable.
    #[arg(short, long)]
    endpoint: Option<String>,

    #[arg(short, long, default_value_t = DEFAULT_RETRIES)]
    retries: u32,

    #[arg(short, long)]
    debug: bool,
}

async fn predict_one(
    client: PredictClient,
    image_filepath: PathBuf,
    mask_filepath: PathBuf,
) -> Result<()> {
    let payload = {
        let file = File::open(&image_filepath)
            .await
            .with_context(|| format!("could not read {}", image_filepath.display()))?;
        let mut reader = BufReader::new(file);
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).await?;
        buffer
    };

    let mask = client.predict(&payload).await?;
    codec::decode(&mask)?;

    {
        let mut file = File::create(&mask_filepath)
            .await
            .with_context(|| format!("could not create {}", mask_filepath.display()))?;
        file.write_all(&mask).await?;
    }

    tracing::info!(
        "wrote {} for {}",
        mask_filepath.display(),
        image_filepath.display()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let endpoint = args.endpoint.unwrap_or_else(|| Config::from_env().api_url);
    let client = PredictClient::new(endpoint).with_retries(args.retries);

    match (
        args.input.is_dir(),
        args.output.is_dir(),
        args.output.exists(),
    ) {
        (false, false, _) => {
            predict_one(client, args.input, args.output).await?;
        }
        (true, false, false) | (true, true, true) => {
            if !args.output.exists() {
                create_dir(args.output.clone())?;
            }

            let mut futures = Vec::new();
            for entry in read_dir(args.input)? {
                let image_filepath = entry?.path();
                if image_filepath.extension().and_then(OsStr::to_str) != Some("png") {
                    continue;
                }
                let image_stem = match image_filepath.file_stem().and_then(OsStr::to_str) {
                    Some(stem) => stem.to_owned(),
                    None => continue,
                };
                let mask_filepath = args.output.join(format!("{image_stem}_mask.png"));
                futures.push(predict_one(client.clone(), image_filepath, mask_filepath));
            }

            try_join_all(futures).await?;
        }
        _ => panic!("Invalid combination of input and output paths."),
    }

    Ok(())
}
