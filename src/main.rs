//! # Veribot — campus FAQ assistant
//!
//! Usage:
//!   veribot chat                 # interactive chat loop
//!   veribot ask "书院的地址在哪里？"
//!   veribot serve                # HTTP gateway (default 127.0.0.1:8080)
//!   veribot stats                # knowledge base summary
//!   veribot test                 # scripted question run

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use veribot_agent::{ChatEngine, seed_demo_data};
use veribot_core::config::VeribotConfig;
use veribot_core::types::Role;

#[derive(Parser)]
#[command(name = "veribot", version, about = "🎓 Veribot — campus FAQ assistant")]
struct Cli {
    /// Path to config.toml (defaults to ~/.veribot/config.toml)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat loop
    Chat {
        /// Answer from the knowledge base only, never call the LLM
        #[arg(long)]
        no_llm: bool,
    },
    /// Ask a single question and exit
    Ask {
        question: String,
        #[arg(long)]
        no_llm: bool,
    },
    /// Run the HTTP gateway
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show knowledge base statistics
    Stats,
    /// Seed demo records and run the scripted test questions
    Test {
        #[arg(long)]
        no_llm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "veribot=debug,tower_http=debug"
    } else {
        "veribot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => VeribotConfig::load_from(path)?,
        None => VeribotConfig::load()?,
    };

    match cli.command {
        Command::Chat { no_llm } => run_chat(config, !no_llm).await,
        Command::Ask { question, no_llm } => {
            let mut engine = ChatEngine::new(config);
            let response = engine.ask(&question, !no_llm).await;
            println!("{response}");
            Ok(())
        }
        Command::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let engine = ChatEngine::new(config.clone());
            veribot_gateway::start(&config, engine).await
        }
        Command::Stats => {
            let engine = ChatEngine::new(config);
            print_stats(&engine);
            Ok(())
        }
        Command::Test { no_llm } => run_test(config, !no_llm).await,
    }
}

fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("🎓 唯理暑期书院智能助手");
    println!("{}", "=".repeat(60));
    println!("欢迎来到唯理书院！我可以回答关于暑期项目的任何问题。");
    println!("输入 'help' 查看命令，输入 'quit' 退出。");
    println!("{}", "=".repeat(60));
}

fn print_help() {
    println!("\n📚 可用命令：");
    println!("  help          - 显示此帮助信息");
    println!("  stats         - 显示统计信息");
    println!("  history       - 显示对话历史");
    println!("  clear         - 清除对话历史");
    println!("  update        - 从文档目录更新知识库");
    println!("  add_faq       - 添加新的常见问题");
    println!("  add_location  - 添加位置信息");
    println!("  add_schedule  - 添加日程信息");
    println!("  quit/exit     - 退出");
    println!("\n💡 示例问题：");
    println!("  - 书院的地址在哪里？");
    println!("  - 书院的日程安排是什么？");
    println!("  - 我需要准备什么床上用品？");
    println!("  - 晚间活动是强制参加的吗？");
    println!("  - 如何邮寄物品到学校？");
}

fn print_stats(engine: &ChatEngine) {
    let stats = engine.stats();
    println!("\n📊 统计信息");
    println!("{}", "-".repeat(30));
    println!("知识库：");
    println!("  文档: {}", stats["knowledge"]["documents"]);
    println!("  常见问题: {}", stats["knowledge"]["faqs"]);
    println!("  位置信息: {}", stats["knowledge"]["locations"]);
    println!("  日程安排: {}", stats["knowledge"]["schedules"]);
    println!("  对话记录: {}", stats["conversation_history_length"]);
    if let Some(updated) = stats["knowledge"]["last_updated"].as_str() {
        if !updated.is_empty() {
            println!("  最后更新: {updated}");
        }
    }
}

fn print_history(engine: &ChatEngine) {
    let history = engine.history();
    if history.is_empty() {
        println!("\n📝 暂无对话历史");
        return;
    }

    let start = history.len().saturating_sub(10);
    println!("\n📝 对话历史 ({} 条记录)", history.len());
    println!("{}", "-".repeat(50));
    for (i, entry) in history[start..].iter().enumerate() {
        let role = match entry.role {
            Role::User => "👤 用户",
            Role::Assistant => "🤖 助手",
        };
        let content: String = entry.content.chars().take(100).collect();
        let ellipsis = if entry.content.chars().count() > 100 { "..." } else { "" };
        println!("{}. {role}: {content}{ellipsis}", i + 1);
        println!("   时间: {}", entry.timestamp);
    }
}

/// Prompt on stdout, read one trimmed line from stdin.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    std::io::stdout().flush().ok()?;
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

fn add_faq_interactive(engine: &mut ChatEngine) {
    println!("\n📝 添加新的常见问题");
    println!("{}", "-".repeat(30));

    let Some(category) = read_line("分类 (例如：general, registration, schedule): ") else { return };
    let Some(question) = read_line("问题: ") else { return };
    let Some(answer) = read_line("答案: ") else { return };
    let Some(keywords) = read_line("关键词 (用逗号分隔，可选): ") else { return };

    if category.is_empty() || question.is_empty() || answer.is_empty() {
        println!("❌ 请提供分类、问题和答案。");
        return;
    }

    let keyword_list = if keywords.is_empty() {
        None
    } else {
        Some(keywords.split(',').map(|k| k.trim().to_string()).collect())
    };
    match engine.store_mut().add_faq(&category, &question, &answer, keyword_list) {
        Ok(()) => println!("✅ FAQ添加成功！"),
        Err(e) => println!("❌ 保存失败: {e}"),
    }
}

fn add_location_interactive(engine: &mut ChatEngine) {
    println!("\n📍 添加位置信息");
    println!("{}", "-".repeat(30));

    let Some(name) = read_line("位置名称: ") else { return };
    let Some(address) = read_line("地址: ") else { return };

    if name.is_empty() || address.is_empty() {
        println!("❌ 请提供位置名称和地址。");
        return;
    }

    match engine.store_mut().add_location(&name, &address, Default::default()) {
        Ok(()) => println!("✅ 位置信息添加成功！"),
        Err(e) => println!("❌ 保存失败: {e}"),
    }
}

fn add_schedule_interactive(engine: &mut ChatEngine) {
    println!("\n📅 添加日程信息");
    println!("{}", "-".repeat(30));

    let Some(name) = read_line("活动名称: ") else { return };
    let Some(date) = read_line("日期 (YYYY-MM-DD): ") else { return };
    let Some(time) = read_line("时间 (HH:MM): ") else { return };
    let Some(description) = read_line("其他详情 (可选): ") else { return };

    if name.is_empty() || date.is_empty() || time.is_empty() {
        println!("❌ 请提供活动名称、日期和时间。");
        return;
    }

    match engine.store_mut().add_schedule(&name, &date, &time, &description) {
        Ok(()) => println!("✅ 日程信息添加成功！"),
        Err(e) => println!("❌ 保存失败: {e}"),
    }
}

async fn run_chat(config: VeribotConfig, use_llm: bool) -> Result<()> {
    let mut engine = ChatEngine::new(config);
    print_banner();

    loop {
        let Some(input) = read_line("\n👤 你: ") else {
            println!("\n👋 再见！感谢使用唯理书院智能助手！");
            break;
        };
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" | "退出" | "再见" => {
                println!("👋 再见！感谢使用唯理书院智能助手！");
                break;
            }
            "help" | "帮助" => print_help(),
            "stats" | "统计" => print_stats(&engine),
            "history" | "历史" => print_history(&engine),
            "clear" | "清除" => {
                engine.clear_history();
                println!("✅ 对话历史已清除！");
            }
            "update" | "更新" => {
                println!("🔄 正在从文档目录更新...");
                match engine.refresh_from_source().await {
                    Ok(count) => println!("✅ 已更新 {count} 个文档！"),
                    Err(e) => println!("❌ 更新失败: {e}"),
                }
            }
            "add_faq" => add_faq_interactive(&mut engine),
            "add_location" => add_location_interactive(&mut engine),
            "add_schedule" => add_schedule_interactive(&mut engine),
            _ => {
                let response = engine.ask(&input, use_llm).await;
                println!("🤖 助手: {response}");
            }
        }
    }

    Ok(())
}

async fn run_test(config: VeribotConfig, use_llm: bool) -> Result<()> {
    let mut engine = ChatEngine::new(config);
    if let Err(e) = seed_demo_data(engine.store_mut()) {
        tracing::warn!("⚠️ Seeding demo data failed: {e}");
    }

    println!("\n🧪 运行测试模式");
    println!("{}", "-".repeat(30));

    let test_questions = [
        "你好！",
        "书院的地址在哪里？",
        "书院的日程安排是什么？",
        "我需要准备什么床上用品？",
        "晚间活动是强制参加的吗？",
        "如何邮寄物品到学校？",
        "谢谢！",
    ];

    for question in test_questions {
        println!("\n👤 用户: {question}");
        let response = engine.ask(question, use_llm).await;
        println!("🤖 助手: {response}");
    }

    print_stats(&engine);
    Ok(())
}
