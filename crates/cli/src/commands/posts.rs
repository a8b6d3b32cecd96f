//! Post commands - draft, schedule, publish, list, upcoming, cancel, delete

use anyhow::{Context, Result};
use social_scheduler_domain::usecases::{Action, CreateOptions, ListFilter};
use social_scheduler_domain::{
    Platform, Post, PostId, Status, TaskRecord, join_platforms, parse_platform_list,
};
use time::format_description::well_known::Rfc3339;

use super::{GlobalOptions, build_service};
use crate::args::{DraftArgs, ListArgs, UpcomingArgs};

pub async fn draft(args: DraftArgs, options: &GlobalOptions) -> Result<()> {
    let platforms = parse_platform_list(&args.platforms).context("Invalid --platforms")?;
    let action = Action::Draft {
        content: args.content.join(" "),
        platforms,
        options: CreateOptions {
            campaign: args.campaign,
            due: args.due,
            priority: args.priority,
            metadata: None,
        },
    };
    run_message(action, options).await
}

pub async fn schedule(id: String, date: String, options: &GlobalOptions) -> Result<()> {
    let id = PostId::new(id);
    run_message(Action::Schedule { id, date }, options).await
}

pub async fn publish(id: String, options: &GlobalOptions) -> Result<()> {
    run_message(Action::Publish { id: PostId::new(id) }, options).await
}

pub async fn cancel(id: String, options: &GlobalOptions) -> Result<()> {
    run_message(Action::Cancel { id: PostId::new(id) }, options).await
}

pub async fn delete(id: String, options: &GlobalOptions) -> Result<()> {
    run_message(Action::Delete { id: PostId::new(id) }, options).await
}

async fn run_message(action: Action, options: &GlobalOptions) -> Result<()> {
    let service = build_service(options)?;
    let output = service.execute(action).await?;
    println!("{}", output.render());
    Ok(())
}

pub async fn list(args: ListArgs, options: &GlobalOptions) -> Result<()> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()
        .context("Invalid status")?;
    let platform = args
        .platform
        .as_deref()
        .map(str::parse::<Platform>)
        .transpose()
        .context("Invalid --platform")?;

    let service = build_service(options)?;
    let output = service
        .execute(Action::List(ListFilter {
            status,
            platform,
            campaign: args.campaign,
            limit: args.limit,
        }))
        .await?;
    let posts = output.posts();

    if args.json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        let label = status.map(|s| s.to_string()).unwrap_or_else(|| "social".to_string());
        println!("No {} posts found", label);
        return Ok(());
    }

    println!("Social Posts ({}):", posts.len());
    for record in posts {
        print_post(record);
    }
    Ok(())
}

pub async fn upcoming(args: UpcomingArgs, options: &GlobalOptions) -> Result<()> {
    let service = build_service(options)?;
    let output = service
        .execute(Action::Upcoming { hours: args.hours })
        .await?;
    let posts = output.posts();

    if args.json {
        println!("{}", serde_json::to_string_pretty(posts)?);
        return Ok(());
    }

    if posts.is_empty() {
        println!("No posts scheduled in the next {} hours", args.hours);
        return Ok(());
    }

    println!("Upcoming Posts ({}):", posts.len());
    for record in posts {
        print_post(record);
    }
    Ok(())
}

fn print_post(record: &TaskRecord) {
    let post = Post::from_record(record);

    let mut details = vec![join_platforms(&post.platforms)];
    details.push(
        post.status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    );
    if let Some(due) = post.due.and_then(|d| d.format(&Rfc3339).ok()) {
        details.push(format!("due {}", due));
    }

    let campaign = post
        .campaign
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default();

    println!("  {}. {}", post.id, post.summary);
    println!("     {}{}", details.join(" • "), campaign);
}
