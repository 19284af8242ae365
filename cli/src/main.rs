use clap::{Parser, Subcommand};
use lectern::model::entity::{
    Course, CourseCreate, Lecture, LectureCreate, PlanStatus, UserEntity, UserEntityCreate,
};
use lectern::model::{CrudRepository, DbConnection, ModelManager};
use lectern::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "Admin tooling for the course database", long_about = None)]
pub struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lectures
    Lecture {
        #[command(subcommand)]
        action: LectureCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
        /// `admin` or `user`
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value_t = 0)]
        price_paise: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum LectureCommands {
    Add {
        #[arg(long)]
        course_id: uuid::Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Object key of the video inside the bucket
        #[arg(long)]
        video_key: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[tokio::main]
async fn main() -> lectern::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&args.database_url)?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                email,
                password,
                name,
                role,
            } => {
                if let Some(existing) = UserEntity::find_by_email(&mm, &actor, &email).await? {
                    println!("User already exists: {} ({})", existing.email(), existing.id());
                    return Ok(());
                }

                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreate {
                        email,
                        name,
                        password_hash: lectern::auth::hash_password(&password)?,
                        role: UserRole::from(role.as_str()),
                        plan_status: PlanStatus::Active,
                        plan_active_until: None,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                title,
                description,
                price_paise,
            } => {
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        thumbnail_key: None,
                        price_inr_paise: price_paise
                            .clamp(0, lectern::payments::MAX_PRICE_PAISE),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Lecture { action } => match action {
            LectureCommands::Add {
                course_id,
                title,
                description,
                video_key,
                order_index,
            } => {
                let lecture = Lecture::create(
                    &mm,
                    &actor,
                    LectureCreate {
                        course_id,
                        title,
                        description,
                        notes_md: None,
                        order_index: order_index.max(0),
                        video_key,
                        storage_provider_id: None,
                    },
                )
                .await?;
                println!("Lecture created: {:?}", lecture);
            }
        },
    }

    Ok(())
}
