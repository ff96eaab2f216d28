use clap::{Parser, Subcommand};
use quiltery::{
    db,
    models::user::{SubscriptionStatus, SubscriptionUpdate},
    repositories::user_repository::SqliteUserRepository,
    services::user_service::{CreateUserRequest, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quiltery-cli")]
#[command(about = "CLI tool for managing Quiltery accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Display name shown on the site
        #[arg(short, long)]
        display_name: Option<String>,

        /// Account status: quilter or designer
        #[arg(short, long)]
        status: Option<String>,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Apply a billing state change to a user
    SetSubscription {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New status: trial, active, expired or cancelled
        #[arg(short, long)]
        status: String,

        /// Subscription plan label
        #[arg(long)]
        plan: Option<String>,

        /// Stripe customer id
        #[arg(long)]
        stripe_customer: Option<String>,

        /// Stripe subscription id
        #[arg(long)]
        stripe_subscription: Option<String>,
    },
}

async fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

async fn confirm_password(prompt: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    let password = get_password(prompt).await?;
    let confirm = get_password("Confirm password").await?;
    Ok((password, confirm))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let pool = db::create_pool().await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Initialize services
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = Arc::new(UserService::new(user_repository));

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                first_name,
                display_name,
                status,
                password,
            } => {
                let password = if let Some(pw) = password {
                    pw
                } else {
                    let (password, confirm) = confirm_password("Password").await?;
                    if password != confirm {
                        eprintln!("❌ Passwords do not match");
                        std::process::exit(1);
                    }
                    password
                };

                let request = CreateUserRequest {
                    email: email.clone(),
                    password,
                    first_name,
                    display_name,
                    status,
                };

                match user_service.create_user(request).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Email: {}", user.email);
                        println!("  Status: {}", user.status);
                        println!("  Subscription: {}", user.subscription_status);
                        if let Some(ends) = user.trial_ends_at {
                            println!("  Trial ends: {}", ends);
                        }
                    }
                    Err(e) => {
                        eprintln!("❌ Failed to create user: {}", e);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) => {
                        if users.is_empty() {
                            println!("No users found");
                        } else {
                            println!(
                                "{:<6} {:<32} {:<10} {:<12} {}",
                                "ID", "Email", "Status", "Subscription", "Trial ends"
                            );
                            for user in users {
                                let trial = user
                                    .trial_ends_at
                                    .map(|t| t.to_rfc3339())
                                    .unwrap_or_else(|| "-".to_string());
                                println!(
                                    "{:<6} {:<32} {:<10} {:<12} {}",
                                    user.id, user.email, user.status, user.subscription_status,
                                    trial
                                );
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("❌ Failed to list users: {}", e);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::SetSubscription {
                email,
                status,
                plan,
                stripe_customer,
                stripe_subscription,
            } => {
                let Some(subscription_status) = SubscriptionStatus::parse(&status) else {
                    eprintln!("❌ Unknown status '{}' (expected trial, active, expired or cancelled)", status);
                    std::process::exit(1);
                };

                let user = match user_service.find_user_by_email(&email).await {
                    Ok(Some(user)) => user,
                    Ok(None) => {
                        eprintln!("❌ No user with email {}", email);
                        std::process::exit(1);
                    }
                    Err(e) => {
                        eprintln!("❌ Lookup failed: {}", e);
                        std::process::exit(1);
                    }
                };

                let update = SubscriptionUpdate {
                    subscription_status,
                    subscription_plan: plan,
                    stripe_customer_id: stripe_customer,
                    stripe_subscription_id: stripe_subscription,
                };

                match user_service.set_subscription(user.id, update).await {
                    Ok(()) => {
                        println!("✅ Subscription updated for {}", email);
                        println!("  Status: {}", subscription_status);
                    }
                    Err(e) => {
                        eprintln!("❌ Failed to update subscription: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        },
    }

    Ok(())
}
