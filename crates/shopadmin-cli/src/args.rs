use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shopadmin_core::models::OrderStatus;

/// shopadmin - terminal admin console for the shop
#[derive(Parser, Debug)]
#[command(name = "shopadmin")]
#[command(version)]
#[command(about = "Manage the shop's users, products, orders and messages", long_about = None)]
#[command(after_help = "Set SHOPADMIN_API_URL to point at another server (default http://localhost:8000).")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in as an administrator
    Login {
        /// Account email (defaults to SHOPADMIN_EMAIL or the last used email)
        email: Option<String>,

        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in admin
    Whoami,

    /// Sales, orders and catalogue overview
    Dashboard,

    /// Customer and staff accounts
    #[command(subcommand)]
    Users(UsersCommand),

    /// Catalogue entries
    #[command(subcommand)]
    Products(ProductsCommand),

    /// Orders, payment and shipping state
    #[command(subcommand)]
    Orders(OrdersCommand),

    /// Customer messages
    #[command(subcommand)]
    Messages(MessagesCommand),
}

/// Search and paging for the list commands
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Filter by a search term
    #[arg(long)]
    pub search: Option<String>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List(ListArgs),
    Show {
        id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Grant or revoke admin rights (true|false)
        #[arg(long)]
        admin: Option<bool>,
    },
    /// Delete one or more users, stopping at the first failure
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

/// Product form fields; anything left out keeps its current value on update
#[derive(Args, Debug, Clone, Default)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    /// Currency code, e.g. USD or NGN
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub stock: Option<i64>,
    #[arg(long)]
    pub sku: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Image file to upload (under 5MB)
    #[arg(long)]
    pub image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        category: Option<String>,
    },
    Show {
        id: i64,
    },
    Create(ProductArgs),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete one or more products, stopping at the first failure
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only paid orders
        #[arg(long, conflicts_with = "unpaid")]
        paid: bool,
        /// Only unpaid orders
        #[arg(long)]
        unpaid: bool,
    },
    Show {
        id: i64,
    },
    MarkPaid {
        id: i64,
    },
    MarkDelivered {
        id: i64,
    },
    MarkRefunded {
        id: i64,
    },
    /// Set status, tracking number or estimated delivery
    Tracking {
        id: i64,
        /// pending, processing, shipped, delivered, cancelled or refunded
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        number: Option<String>,
        /// Estimated delivery date
        #[arg(long)]
        eta: Option<String>,
    },
    /// Approve a customer-confirmed bank transfer
    ApproveTransfer {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
    List {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Show a message, marking it read
    Show {
        id: i64,
    },
    Reply {
        id: i64,
        /// Reply text; words are joined with spaces
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("shopadmin").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_orders_list_filters() {
        let cli = parse(&["orders", "list", "--search", "jane", "--paid", "--page=3"]).unwrap();
        match cli.command {
            Command::Orders(OrdersCommand::List { list, paid, unpaid }) => {
                assert_eq!(list.search.as_deref(), Some("jane"));
                assert_eq!(list.page, 3);
                assert!(paid);
                assert!(!unpaid);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(parse(&["orders", "list", "--paid", "--unpaid"]).is_err());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        assert!(parse(&["users", "list", "--serch", "jane"]).is_err());
        assert!(parse(&["users", "list", "--page", "0"]).is_err());
    }

    #[test]
    fn test_reply_text_after_double_dash() {
        let cli = parse(&["messages", "reply", "3", "--", "--thanks", "for", "waiting"]).unwrap();
        match cli.command {
            Command::Messages(MessagesCommand::Reply { id, text }) => {
                assert_eq!(id, 3);
                assert_eq!(text, vec!["--thanks", "for", "waiting"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ids_and_values_are_typed() {
        let cli = parse(&["users", "delete", "4", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Users(UsersCommand::Delete { ref ids }) if ids == &[4, 7]
        ));
        assert!(parse(&["users", "delete"]).is_err());
        assert!(parse(&["users", "show", "x"]).is_err());
        assert!(parse(&["products", "create", "--stock", "many"]).is_err());

        let cli = parse(&["orders", "tracking", "9", "--status", "shipped"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Orders(OrdersCommand::Tracking { status: Some(OrderStatus::Shipped), .. })
        ));
        assert!(parse(&["orders", "tracking", "9", "--status", "lost"]).is_err());
    }

    #[test]
    fn test_user_admin_flag_takes_a_value() {
        let cli = parse(&["users", "update", "2", "--admin", "false"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Users(UsersCommand::Update { admin: Some(false), .. })
        ));
    }
}
