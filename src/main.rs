use clap::{Parser, Subcommand};
use dotenv::dotenv;
use human_panic::setup_panic;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, warn};

// 从 lib.rs 导入模块
use rust_internship_eval::config::AppConfig;
use rust_internship_eval::errors::{PortalError, Result};
use rust_internship_eval::models::common::{SortSpec, ZeroBasedPage, dates::parse_flexible_date};
use rust_internship_eval::models::evaluations::{
    EvaluationListQuery, EvaluationListView, EvaluationViewModel, EvaluatorRef, RubricField,
};
use rust_internship_eval::runtime::lifetime;
use rust_internship_eval::runtime::lifetime::startup::StartupContext;
use rust_internship_eval::services::EvaluationListController;
use rust_internship_eval::services::evaluations::score::format_score;
use rust_internship_eval::services::evaluations::{EvaluationForm, FormOptions};

#[derive(Parser)]
#[command(name = "rust-internship-eval", version)]
#[command(about = "实习评价仪表盘（指导教师 / 企业导师）", long_about = None)]
struct Cli {
    /// 登录用户名
    #[arg(long, env = "API_USERNAME", global = true)]
    username: Option<String>,
    /// 登录密码
    #[arg(long, env = "API_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 评价列表、统计与可选学生
    List {
        #[arg(long, default_value = "")]
        keyword: String,
        #[arg(long, default_value = "ALL")]
        status: String,
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        academic_year: Option<String>,
        /// 页码，从 0 开始
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
        /// field,asc|desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// 只读查看一条评价
    Show { id: i64 },
    /// 新建评价
    Create {
        #[arg(long)]
        student: Option<i64>,
        #[arg(long)]
        internship: Option<i64>,
        /// 评分项，形如 followingRules=0.8，可重复
        #[arg(long = "score", value_name = "FIELD=VALUE")]
        scores: Vec<String>,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        final_evaluation: bool,
        #[arg(long)]
        date: Option<String>,
    },
    /// 修改已有评价
    Update {
        id: i64,
        #[arg(long = "score", value_name = "FIELD=VALUE")]
        scores: Vec<String>,
        #[arg(long)]
        comments: Option<String>,
        #[arg(long)]
        final_evaluation: Option<bool>,
        #[arg(long)]
        date: Option<String>,
    },
    /// 学生的评价历史
    History { student_id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    // 记录程序启动时间
    let start_datetime = chrono::Utc::now();

    // 初始化配置
    setup_panic!();
    let cli = Cli::parse();
    if let Err(e) = AppConfig::init() {
        eprintln!("{}", PortalError::from(e).format_simple());
        return ExitCode::FAILURE;
    }
    let config = AppConfig::get();

    // 初始化日志
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    debug!(
        "Project: {} Version: {} System: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.system_name
    );

    let result = tokio::select! {
        res = run(cli) => res,
        _ = lifetime::shutdown::listen_for_shutdown() => Ok(()),
    };

    debug!(
        "Finished in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start_datetime)
            .num_milliseconds()
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &PortalError) {
    #[cfg(debug_assertions)]
    eprintln!("{}", e.format_colored());
    #[cfg(not(debug_assertions))]
    eprintln!("{}", e.format_simple());
    if e.is_request_failure() {
        eprintln!("  请检查网络连接与 API 地址 ({})", AppConfig::get().api.base_url);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = lifetime::startup::prepare_client_startup()?;
    let evaluator = sign_in(&ctx, &cli).await?;

    match cli.command {
        Command::List {
            keyword,
            status,
            semester,
            academic_year,
            page,
            size,
            sort,
        } => {
            let config = AppConfig::get();
            let mut query = EvaluationListQuery::with_size(
                config.clamp_page_size(size.unwrap_or(config.pagination.default_size)),
            );
            query.keyword = keyword;
            query.status = EvaluationListQuery::normalize_filter(Some(status));
            query.semester = EvaluationListQuery::normalize_filter(semester);
            query.academic_year = EvaluationListQuery::normalize_filter(academic_year);
            query.page = ZeroBasedPage(page);
            if let Some(sort) = sort {
                query.sort = SortSpec::parse(&sort)?;
            }

            let controller = EvaluationListController::new(
                ctx.evaluations.clone(),
                ctx.profiles.clone(),
                evaluator,
                query,
                config.pagination.max_size,
            );
            controller.load_all().await;
            print_list(&controller.snapshot());
        }
        Command::Show { id } => {
            let evaluation = ctx.evaluations.get_evaluation(id).await?;
            let form = EvaluationForm::view(evaluator, evaluation);
            print_view(&form.view_model());
        }
        Command::Create {
            student,
            internship,
            scores,
            comments,
            final_evaluation,
            date,
        } => {
            let config = AppConfig::get();
            let controller = EvaluationListController::new(
                ctx.evaluations.clone(),
                ctx.profiles.clone(),
                evaluator,
                EvaluationListQuery::with_size(config.pagination.default_size),
                config.pagination.max_size,
            );
            tokio::join!(controller.load_statistics(), controller.load_options());
            let errors = controller.snapshot().errors;
            if let Some(e) = errors.options.as_deref().or(errors.statistics.as_deref()) {
                warn!("Create form context incomplete: {}", e);
            }

            // 同时给出学生与实习视为明确指定的评价对象
            let options = FormOptions {
                preselected: student.zip(internship),
                ..controller.form_options()
            };
            let mut form = EvaluationForm::create(evaluator, options);
            if student.is_some() && form.student_id() != student {
                form.select_student(student);
            }
            if internship.is_some() && form.internship_id() != internship {
                form.select_internship(internship);
            }
            fill_form(&mut form, &scores, comments, Some(final_evaluation), date)?;
            submit(&ctx, &mut form).await?;
        }
        Command::Update {
            id,
            scores,
            comments,
            final_evaluation,
            date,
        } => {
            let evaluation = ctx.evaluations.get_evaluation(id).await?;
            let mut form = EvaluationForm::edit(evaluator, evaluation)?;
            fill_form(&mut form, &scores, comments, final_evaluation, date)?;
            submit(&ctx, &mut form).await?;
        }
        Command::History { student_id } => {
            let history = ctx.evaluations.student_history(student_id).await?;
            if history.is_empty() {
                println!("学生 {student_id} 暂无评价记录");
            }
            for evaluation in &history {
                if let Some(name) = evaluation.evaluator_name() {
                    println!("评价人: {name}");
                }
                let form = EvaluationForm::view(evaluator, evaluation.clone());
                print_view(&form.view_model());
            }
        }
    }
    Ok(())
}

/// 登录并解析评价者身份；身份查询失败时允许手动重试
async fn sign_in(ctx: &StartupContext, cli: &Cli) -> Result<EvaluatorRef> {
    let config = AppConfig::get();
    let username = cli
        .username
        .clone()
        .unwrap_or_else(|| config.auth.username.clone());
    let password = cli
        .password
        .clone()
        .unwrap_or_else(|| config.auth.password.clone());

    let user = ctx.session.login(&username, &password).await?;
    let role = user.role.evaluator_role().ok_or_else(|| {
        PortalError::authentication(format!("角色 {} 没有评价权限", user.role))
    })?;

    loop {
        match ctx.profiles.resolve_evaluator(user.id, role).await {
            Ok(evaluator) => return Ok(evaluator),
            Err(e) => {
                report(&e);
                if !ask_retry().await {
                    return Err(e);
                }
            }
        }
    }
}

async fn ask_retry() -> bool {
    tokio::task::spawn_blocking(|| {
        print!("重试? [y/N] ");
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer).is_ok()
            && matches!(answer.trim(), "y" | "Y" | "yes")
    })
    .await
    .unwrap_or(false)
}

fn fill_form(
    form: &mut EvaluationForm,
    scores: &[String],
    comments: Option<String>,
    final_evaluation: Option<bool>,
    date: Option<String>,
) -> Result<()> {
    for raw in scores {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| PortalError::validation(format!("评分格式应为 FIELD=VALUE: {raw}")))?;
        let field = RubricField::from_key(key.trim())
            .ok_or_else(|| PortalError::validation(format!("未知评分项: {key}")))?;
        let breakdown = form.set_score_input(field, value)?;
        debug!("{} = {} -> total {}", field, value, breakdown.total_score);
    }
    if let Some(comments) = comments {
        form.set_comments(comments)?;
    }
    if let Some(is_final) = final_evaluation {
        form.set_final_evaluation(is_final)?;
    }
    if let Some(date) = date {
        let parsed = parse_flexible_date(&date)
            .ok_or_else(|| PortalError::validation(format!("无法识别的日期: {date}")))?;
        form.set_evaluation_date(Some(parsed))?;
    }
    Ok(())
}

async fn submit(ctx: &StartupContext, form: &mut EvaluationForm) -> Result<()> {
    if let Some(notice) = form.notice() {
        println!("{notice}");
    }
    match form.submit(&ctx.evaluations).await {
        Ok(saved) => {
            println!("已保存评价 #{}", saved.id.unwrap_or_default());
            print_view(&form.view_model());
            Ok(())
        }
        Err(e) => {
            for (field, msg) in form.field_errors() {
                eprintln!("  {field}: {msg}");
            }
            Err(e)
        }
    }
}

fn print_list(view: &EvaluationListView) {
    let stats = &view.statistics;
    println!(
        "评价总数 {}  待完成 {}  已完成 {}  平均分 {}",
        stats.total_evaluations,
        stats.pending_evaluations,
        stats.completed_evaluations,
        stats
            .average_score
            .map(format_score)
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(err) = &view.errors.statistics {
        println!("  (统计加载失败: {err})");
    }

    println!(
        "{:<6} {:<10} {:<12} {:<20} {:>6} {:>6} {:>6} {:<12}",
        "ID", "学号", "学生", "单位", "纪律", "专业", "总分", "日期"
    );
    for row in &view.rows {
        println!(
            "{:<6} {:<10} {:<12} {:<20} {:>6} {:>6} {:>6} {:<12}",
            row.id.map(|id| id.to_string()).unwrap_or_default(),
            row.student_code.as_deref().unwrap_or("-"),
            row.student_name.as_deref().unwrap_or("-"),
            row.company_name.as_deref().unwrap_or("-"),
            format_score(row.discipline_score),
            format_score(row.professional_score),
            format_score(row.total_score),
            row.evaluation_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
        );
    }
    if let Some(err) = &view.errors.list {
        println!("  (列表加载失败: {err})");
    }
    println!(
        "第 {} / {} 页，共 {} 条",
        view.query.page.to_one_based(),
        view.total_pages.max(1),
        view.total
    );

    match &view.errors.options {
        Some(err) => println!("可选学生加载失败: {err}"),
        None => println!(
            "可选学生 {} 名，可选实习 {} 项",
            view.students.len(),
            view.internships.len()
        ),
    }
}

fn print_view(view: &EvaluationViewModel) {
    println!(
        "评价 #{}  {}  {}",
        view.evaluation_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        view.student_name.as_deref().unwrap_or("-"),
        view.company_name.as_deref().unwrap_or("-")
    );
    for part in &view.parts {
        println!("  {} {}", part.label, part.display);
        for item in &part.items {
            println!(
                "    {:<16} {:>4}/{:<4} {:>5.0}%",
                item.label,
                item.display,
                format_score(item.cap),
                item.percent
            );
        }
    }
    println!("  总分 {}", view.total_display);
    if let Some(comments) = &view.comments {
        println!("  评语: {comments}");
    }
    if view.is_final_evaluation {
        println!("  (最终评价)");
    }
}
