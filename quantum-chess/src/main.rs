use std::path::PathBuf;

use anyhow::{Context, Result};
use chess_core::{Fen, MoveGenerator, Notation, Position, INITIAL_FEN};
use clap::{Parser, Subcommand};
use quantum_ai::{BackendKind, Method, QuantumSelector, SearchPreset};
use quantum_chess::{apply_overrides, load_config, save_config, self_play, Overrides, SelectionReport};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "quantum-chess", version, about = "量子启发式国际象棋走法选择")]
struct Cli {
    /// JSON 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "standard")]
    preset: SearchPreset,

    #[arg(long, global = true)]
    seed: Option<u64>,

    /// simulator / exact / disabled
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// 未来局面图深度
    #[arg(long, global = true)]
    depth: Option<u8>,

    #[arg(long, global = true)]
    shots: Option<u32>,

    /// 输出 JSON
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    command: SubCommands,
}

#[derive(Debug, Subcommand)]
enum SubCommands {
    /// 为一个局面选择走法
    Select {
        #[arg(long, default_value = INITIAL_FEN)]
        fen: String,

        /// classical / grover / quantum_walk / true_quantum_walk / qaoa
        #[arg(short, long, default_value = "grover")]
        method: String,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// 先在局面上走的棋（UCI 或 SAN）
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,
    },
    /// 自对弈若干半回合
    Play {
        #[arg(long, default_value = INITIAL_FEN)]
        fen: String,

        #[arg(short, long, default_value = "grover")]
        method: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        plies: usize,
    },
    /// 显示局面信息
    Info {
        #[arg(long, default_value = INITIAL_FEN)]
        fen: String,
    },
    /// 输出或保存当前生效的配置
    Config {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("quantum_chess=info".parse()?))
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        seed: cli.seed,
        backend: cli.backend,
        depth: cli.depth,
        shots: cli.shots,
    };
    let config = apply_overrides(load_config(cli.config.as_deref(), cli.preset), &overrides);

    match cli.command {
        SubCommands::Select {
            fen,
            method,
            top_k,
            moves,
        } => {
            let position = play_moves(Fen::parse(&fen)?, &moves)?;
            let method = Method::from_str_lossy(&method);
            let top_k = top_k.unwrap_or(config.top_k);

            let mut selector = QuantumSelector::new(config);
            info!("后端: {}", selector.backend_name());
            let legal_moves = MoveGenerator::generate_legal(&position);
            let selection = selector
                .select_move(&position, &legal_moves, method, top_k)
                .context("走法选择失败")?;

            let report = SelectionReport::new(&position, &selection);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
        SubCommands::Play { fen, method, plies } => {
            let start = Fen::parse(&fen)?;
            let method = Method::from_str_lossy(&method);

            let mut selector = QuantumSelector::new(config);
            let record = self_play(&mut selector, &start, method, plies)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                for ply in &record.plies {
                    println!(
                        "{:>3}. {:<8} {:<6} {:?} p={:.3}",
                        ply.ply, ply.san, ply.uci, ply.outcome, ply.probability
                    );
                }
                println!();
                println!("{}", record.movetext(&start));
                println!("终局状态: {:?}", record.status);
                println!("最终局面: {}", record.final_fen);
            }
        }
        SubCommands::Info { fen } => {
            let info = Fen::parse(&fen)?.info();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("走子方: {}", info.turn);
                println!("易位权: {}", info.castling_rights);
                println!("吃过路兵: {}", info.en_passant.as_deref().unwrap_or("-"));
                println!("半回合计数: {}", info.halfmove_clock);
                println!("回合数: {}", info.fullmove_number);
                println!("合法走法数: {}", info.legal_moves_count);
                println!("将军: {}", info.is_check);
                println!("将死: {}", info.is_checkmate);
                println!("逼和: {}", info.is_stalemate);
                println!("子力不足: {}", info.is_insufficient_material);
                println!("状态: {:?}", info.status);
            }
        }
        SubCommands::Config { output } => match output {
            Some(path) => save_config(&config, &path)?,
            None => println!("{}", serde_json::to_string_pretty(&config)?),
        },
    }

    Ok(())
}

/// 依次走棋
fn play_moves(mut position: Position, moves: &[String]) -> Result<Position> {
    for text in moves {
        let mv = Notation::parse(&position, text).with_context(|| format!("无法解析走法: {}", text))?;
        position = MoveGenerator::apply(&position, mv)?;
    }
    Ok(position)
}
