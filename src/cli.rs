use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use httpast::config::{ConfigLoader, ParserConfig};
use httpast::parser::HttpFileParser;
use httpast::printer;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 配置文件路径，默认自动查找 httpast.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 严格模式，覆盖配置文件
    #[arg(long, global = true)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 解析文件并输出 JSON
    Parse {
        path: PathBuf,

        /// 输出紧凑的 JSON
        #[arg(long)]
        compact: bool,

        /// 只输出 AST
        #[arg(long)]
        ast_only: bool,
    },

    /// 列出文件中的请求
    List { path: PathBuf },
}

/// 加载配置：显式路径优先，其次自动查找，都没有时使用默认配置
fn load_config(cli: &Cli) -> Result<ParserConfig> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path)?,
        None => ConfigLoader::find_and_load()?.unwrap_or_default(),
    };

    Ok(ParserConfig {
        strict: config.strict || cli.strict,
        ..config
    })
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let options = config.to_options();

    match cli.command {
        Commands::Parse {
            path,
            compact,
            ast_only,
        } => {
            let output = HttpFileParser::parse_file(&path, &options)
                .with_context(|| format!("Failed to parse {}", path.display()))?;

            let pretty = config.pretty && !compact;
            println!("{}", printer::render_json(&output, ast_only, pretty)?);
        }
        Commands::List { path } => {
            let output = HttpFileParser::parse_file(&path, &options)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            printer::print_summary(&output.ast, &output.diagnostics);
        }
    }

    Ok(())
}
