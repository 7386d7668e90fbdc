use pet_battle_sim::{run, CliOptions, Mode};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: pet-battle-sim [--tournament | --custom] [--battles N] [--seed SEED] [--output results.csv] \
[--team-length N] [--chunk-size N] [--teams teams.json]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut opts = CliOptions::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tournament" => opts.mode = Mode::Tournament,
            "--custom" => opts.mode = Mode::Custom,
            "--battles" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--battles requires a number"))?;
                opts.battles = Some(val.parse()?);
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                opts.seed = Some(val.parse()?);
            }
            "--output" => {
                opts.output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output results.csv)")
                })?);
            }
            "--team-length" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--team-length requires a number"))?;
                opts.team_length = val.parse()?;
                if opts.team_length == 0 || opts.team_length > 5 {
                    anyhow::bail!("--team-length must be between 1 and 5, got {}", opts.team_length);
                }
            }
            "--chunk-size" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--chunk-size requires a number"))?;
                opts.chunk_size = val.parse()?;
            }
            "--teams" => {
                opts.teams_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--teams requires a path (e.g. --teams teams.json)")
                })?);
                opts.mode = Mode::Custom;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(opts)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = parse_args()?;
    run(opts)
}
