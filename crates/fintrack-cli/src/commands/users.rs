use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use inquire::Confirm;

use fintrack_data::{Delete, Insert, Query, Retrieve, User, UserFilter};
use fintrack_db::Connection;

use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Users {
    /// List users
    #[clap(name = "list")]
    List(ListUsers),
    /// Add a user
    #[clap(name = "add")]
    Add(AddUser),
    /// Delete a user and everything they recorded
    #[clap(name = "delete")]
    Delete(DeleteUser),
}

impl Users {
    pub async fn run(self, db: &Connection) -> Result<()> {
        match self {
            Users::List(cmd) => cmd.run(db).await,
            Users::Add(cmd) => cmd.run(db).await,
            Users::Delete(cmd) => cmd.run(db).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListUsers {
    #[clap(short, long)]
    pub id: Option<u32>,
    #[clap(short, long)]
    pub username: Option<String>,
    #[clap(short, long)]
    pub email: Option<String>,
}

impl ListUsers {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let filter = UserFilter {
            id: self.id,
            username: self.username,
            email: self.email,
        };

        let users: Vec<User> = db.query(&filter).await?;
        println!("{} users.", users.len());
        users.print_formatted();

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddUser {
    #[clap(short, long)]
    pub username: String,
    #[clap(short, long)]
    pub email: Option<String>,
}

impl AddUser {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let users: Vec<User> = db
            .query(&UserFilter {
                username: Some(self.username.clone()),
                ..Default::default()
            })
            .await?;
        if !users.is_empty() {
            return Err(anyhow!("User {} already exists.", self.username));
        }

        let user = db
            .insert(User {
                username: self.username,
                email: self.email.unwrap_or_default(),
                ..Default::default()
            })
            .await?;
        println!("User added with id {}.", user.id);

        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteUser {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteUser {
    pub async fn run(self, db: &Connection) -> Result<()> {
        let user: User = db.retrieve(self.id).await?;
        println!();
        user.print_formatted();
        println!();
        let confirm = Confirm::new(
            "Delete user with all transactions, budgets and alerts?",
        )
        .with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }
        db.delete(user).await?;
        Ok(())
    }
}
