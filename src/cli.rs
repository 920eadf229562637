use anyhow::{Context, Result};

use reedline::{DefaultCompleter, DefaultHinter, DefaultPrompt, Reedline, Signal};
use tracing::{info, warn};

use crate::agent::{Agent, ChatBackend, GeminiClient, RetryPolicy, TurnOutcome};
use crate::config::Config;
use crate::error::ChatError;
use crate::hints::HintCategory;
use crate::logging;
use crate::prompts;

/// 打印帮助信息
fn print_help() {
    println!("🎯 careerai - 职业规划 AI 助手 (Gemini)");
    println!();
    println!("用法：careerai <命令>");
    println!();
    println!("命令:");
    println!("  chat            进入对话模式（默认）");
    println!("  check           测试 API 连接");
    println!("  models          列出可用模型并测试第一个");
    println!("  init            生成默认配置文件");
    println!("  help            显示此帮助信息");
    println!();
    print_chat_help();
    println!("环境变量:");
    println!("  GEMINI_API_KEY     API 密钥（必需）");
    println!("  GEMINI_MODEL       覆盖模型名称");
    println!("  MAX_OUTPUT_TOKENS  覆盖最大输出 token");
    println!("  LOG_LEVEL          覆盖日志级别");
}

fn print_chat_help() {
    println!("对话模式命令:");
    println!("  /clear                          - 清空当前会话历史");
    println!("  /new                            - 开始新会话");
    println!("  /info                           - 会话信息");
    println!("  /topics                         - 列出快捷话题");
    println!("  /topic <序号>                   - 发送快捷话题");
    println!("  /resume <简历内容>              - 简历点评");
    println!("  /interview <职位> | <公司> | <背景> - 面试准备");
    println!("  /retry                          - 重新发送上一个失败的问题");
    println!("  /quit                           - 退出");
    println!();
}

/// 打印错误和对应的修复提示
fn print_failure(error: &str, hint: HintCategory) {
    println!("❌ API 调用失败：");
    println!("   {}", error);
    println!("{}", hint.hint());
}

/// 构建客户端，缺少密钥时直接退出
fn build_client(config: &Config) -> GeminiClient {
    match GeminiClient::from_config(config, prompts::build_system_prompt()) {
        Ok(client) => client,
        Err(e) => {
            report_fatal(&e);
            std::process::exit(1);
        }
    }
}

fn report_fatal(err: &ChatError) {
    let message = err.to_string();
    warn!(class = ?err.class(), "client unavailable: {}", message);
    eprintln!("❌ API 未连接：{}", message);
    eprintln!("{}", HintCategory::classify(&message).hint());
}

/// Init 命令 - 生成默认配置
fn run_init() -> Result<()> {
    let path = Config::default_path();
    if path.exists() {
        println!("⚠️ 配置文件已存在：{}", path.display());
        return Ok(());
    }

    Config::default()
        .save(&path)
        .context("保存配置文件失败")?;
    println!("✅ 保存配置：{}", path.display());
    println!();
    println!("下一步:");
    println!("  1. export GEMINI_API_KEY=<你的密钥>");
    println!("  2. 运行 'careerai check' 测试连接");
    println!("  3. 运行 'careerai' 开始对话");
    Ok(())
}

/// Check 命令 - 连接自检
async fn run_check(config: &Config) -> Result<()> {
    let client = build_client(config);
    println!("🔌 测试模型：{}", client.model());

    let status = client.ping().await;
    if status.connected {
        info!("{}", status.detail);
        println!("✅ {}", status.detail);
        Ok(())
    } else {
        print_failure(&status.detail, HintCategory::classify(&status.detail));
        std::process::exit(1);
    }
}

/// Models 命令 - 列出模型并测试第一个
async fn run_models(config: &Config) -> Result<()> {
    let client = build_client(config);

    println!("[1] 获取可用模型...");
    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            let message = e.to_string();
            print_failure(&message, HintCategory::classify(&message));
            std::process::exit(1);
        }
    };

    if models.is_empty() {
        println!("📭 没有支持 generateContent 的模型，该密钥可能没有 Gemini API 权限");
        println!("   在 https://aistudio.google.com/apikey 创建新密钥");
        return Ok(());
    }

    println!("\n找到 {} 个支持 generateContent 的模型:\n", models.len());
    for model in &models {
        match &model.display_name {
            Some(display) => println!("  -> {} ({})", model.name, display),
            None => println!("  -> {}", model.name),
        }
    }

    println!("\n[2] 测试第一个模型...");
    let mut probe = config.clone();
    probe.gemini.model = models[0].name.clone();
    let status = build_client(&probe).ping().await;
    if status.connected {
        println!("✅ {}", status.detail);
        println!("   可在配置中使用：model = \"{}\"", models[0].name);
    } else {
        print_failure(&status.detail, HintCategory::classify(&status.detail));
    }

    Ok(())
}

fn show_outcome(outcome: &TurnOutcome, config: &Config) {
    let envelope = &outcome.envelope;
    if envelope.success {
        println!("🎯 CareerAI: {}\n", envelope.text);
        if config.chat.show_token_usage && envelope.tokens_used > 0 {
            println!("🔢 Tokens used: {}\n", envelope.tokens_used);
        }
    } else {
        print_failure(
            &envelope.error,
            outcome.hint.unwrap_or(HintCategory::Generic),
        );
        println!();
        println!("{}\n", prompts::FALLBACK_RESPONSE);
    }
}

/// 解析 "/interview 职位 | 公司 | 背景"
fn parse_interview(args: &str) -> Option<(String, String, String)> {
    let parts: Vec<&str> = args.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [title, company, background] if !title.is_empty() => Some((
            title.to_string(),
            company.to_string(),
            background.to_string(),
        )),
        _ => None,
    }
}

/// 斜杠命令解析结果
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Clear,
    New,
    Info,
    Help,
    Topics,
    Retry,
    Send(String),
    Invalid(String),
}

fn parse_command(input: &str) -> Command {
    let (cmd, args) = match input.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd.to_lowercase(), args.trim()),
        None => (input.to_lowercase(), ""),
    };

    match cmd.as_str() {
        "/quit" | "/exit" => Command::Quit,
        "/clear" => Command::Clear,
        "/new" => Command::New,
        "/info" => Command::Info,
        "/help" | "/h" => Command::Help,
        "/topics" => Command::Topics,
        "/retry" => Command::Retry,
        "/topic" => match args.parse::<usize>().ok().and_then(prompts::quick_prompt) {
            Some(topic) => Command::Send(topic.to_string()),
            None => Command::Invalid("用法：/topic <1-5>".to_string()),
        },
        "/resume" if !args.is_empty() => Command::Send(prompts::build_resume_prompt(args)),
        "/resume" => Command::Invalid("用法：/resume <简历内容>".to_string()),
        "/interview" => match parse_interview(args) {
            Some((title, company, background)) => Command::Send(
                prompts::build_interview_prep_prompt(&title, &company, &background),
            ),
            None => Command::Invalid("用法：/interview <职位> | <公司> | <背景>".to_string()),
        },
        _ => Command::Invalid(format!("未知命令：{}", input)),
    }
}

/// Chat 命令 - 交互式对话
async fn run_chat(config: &Config) -> Result<()> {
    println!("🎯 {}", config.app.title);
    println!("{}", config.app.description);
    println!();

    let client = build_client(config);
    let mut agent = Agent::new(
        client,
        RetryPolicy::from_settings(&config.gemini),
        config.chat.max_history_turns,
    );

    println!("🤖 模型：{}", agent.model());
    if config.chat.show_session_info {
        println!("📝 当前会话：{}", agent.session().id());
    }
    println!("输入 /help 查看命令，/quit 退出\n");
    println!("{}\n", prompts::WELCOME_MESSAGE);

    let completer = DefaultCompleter::default();
    let hinter = DefaultHinter::default();
    let prompt = DefaultPrompt::default();

    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(hinter))
        .with_completer(Box::new(completer));

    let mut last_failed: Option<String> = None;

    loop {
        let sig = line_editor.read_line(&prompt)?;

        let input = match sig {
            Signal::Success(buffer) => buffer.trim().to_string(),
            Signal::CtrlD => {
                println!("\n👋 再见！");
                break;
            }
            Signal::CtrlC => {
                println!("\n输入 /quit 退出，或继续输入问题");
                continue;
            }
        };

        if input.is_empty() {
            continue;
        }

        // question 是失败后 /retry 要重发的原始问题
        let (message, question) = if input.starts_with('/') {
            match parse_command(&input) {
                Command::Quit => {
                    println!("👋 再见！");
                    break;
                }
                Command::Clear => {
                    agent.clear_history();
                    println!("✅ 已清空当前会话历史\n");
                    continue;
                }
                Command::New => {
                    let id = agent.new_session();
                    println!("✅ 已创建新会话：{}\n", id);
                    continue;
                }
                Command::Info => {
                    let session = agent.session();
                    println!("📊 会话 {}", session.id());
                    println!(
                        "   创建时间：{} | 消息数：{} | Tokens：{}\n",
                        session.created_at().format("%Y-%m-%d %H:%M"),
                        session.count(),
                        session.total_tokens_used()
                    );
                    continue;
                }
                Command::Help => {
                    print_chat_help();
                    continue;
                }
                Command::Topics => {
                    println!("💡 快捷话题:");
                    for (i, topic) in prompts::QUICK_PROMPTS.iter().enumerate() {
                        println!("  {}. {}", i + 1, topic);
                    }
                    println!();
                    continue;
                }
                Command::Retry => match last_failed.take() {
                    Some(question) => (prompts::build_context_prompt(&question), question),
                    None => {
                        println!("没有需要重试的问题\n");
                        continue;
                    }
                },
                Command::Send(text) => (text.clone(), text),
                Command::Invalid(reason) => {
                    println!("❌ {}", reason);
                    println!("输入 /help 查看帮助\n");
                    continue;
                }
            }
        } else {
            (input.clone(), input)
        };

        println!("⏳ CareerAI is thinking...");
        let outcome = agent.chat(&message).await;
        show_outcome(&outcome, config);

        last_failed = if outcome.is_success() {
            None
        } else {
            Some(question)
        };
    }

    Ok(())
}

/// 主入口函数
pub async fn run_cli() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args
        .get(1)
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| "chat".to_string());

    if matches!(command.as_str(), "help" | "-h" | "--help" | "h") {
        print_help();
        return Ok(());
    }
    if command == "init" {
        return run_init();
    }

    let config = Config::load_default()?;
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("⚠️ 日志初始化失败：{:#}", e);
    }
    info!(model = %config.gemini.model, "Application started");

    match command.as_str() {
        "chat" | "c" => run_chat(&config).await,
        "check" => run_check(&config).await,
        "models" => run_models(&config).await,
        _ => {
            eprintln!("❌ 未知命令：{}", command);
            eprintln!();
            eprintln!("运行 'careerai help' 查看帮助信息");
            std::process::exit(1);
        }
    }
}
