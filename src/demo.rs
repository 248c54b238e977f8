//! Sample data for manual testing.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    auth::{Email, PasswordHash, User, ValidatedPassword, create_user, set_initial_balance},
    category::{CategoryType, get_visible_categories},
    database_id::CategoryId,
    debt::{DebtPriority, NewDebtForm, create_debt},
    piggy_bank::{
        MovementForm, MovementType, NewPiggyBankForm, PeriodType, add_transaction,
        create_piggy_bank,
    },
    receivable::{NewReceivableForm, create_receivable},
    recurring::{NewRecurringForm, create_recurring},
    transaction::{PaymentMethod, Transaction, create_transaction},
    wishlist::{NewWishlistItemForm, WishlistStatus, create_wishlist_item},
};

/// The email of the demo user.
pub const DEMO_EMAIL: &str = "demo@xfin.com";
/// The password of the demo user.
pub const DEMO_PASSWORD: &str = "demo123";

/// Create the demo user with an initial balance and a little of every kind of record.
///
/// `today` anchors the dates of the sample records.
///
/// # Errors
/// Returns an error if the demo user already exists or a record cannot be created.
pub fn seed_demo_data(
    today: Date,
    password_hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let password_hash =
        PasswordHash::new(ValidatedPassword::new_unchecked(DEMO_PASSWORD), password_hash_cost)?;
    let user = create_user("Demo User", &Email::new(DEMO_EMAIL)?, &password_hash, connection)?;
    let user = set_initial_balance(user.id, 5000.0, connection)?;

    let category = |name: &str, category_type: CategoryType| -> Result<CategoryId, Error> {
        get_visible_categories(user.id, connection)?
            .into_iter()
            .find(|category| {
                category.name.as_ref() == name && category.category_type == category_type
            })
            .map(|category| category.id)
            .ok_or(Error::NotFound)
    };
    let salary = category("Salary", CategoryType::Income)?;
    let food = category("Food", CategoryType::Expense)?;
    let transport = category("Transport", CategoryType::Expense)?;
    let housing = category("Housing", CategoryType::Expense)?;

    let first_of_month = today
        .replace_day(1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    create_transaction(
        Transaction::build(CategoryType::Income, 5000.0, first_of_month, salary)
            .description(Some("Monthly salary".to_owned()))
            .payment_method(Some(PaymentMethod::BankTransfer)),
        user.id,
        connection,
    )?;
    create_transaction(
        Transaction::build(CategoryType::Expense, 800.0, first_of_month, food)
            .description(Some("Groceries".to_owned()))
            .payment_method(Some(PaymentMethod::Card))
            .is_important(true),
        user.id,
        connection,
    )?;
    create_transaction(
        Transaction::build(CategoryType::Expense, 150.0, today, transport)
            .description(Some("Fuel".to_owned()))
            .payment_method(Some(PaymentMethod::Card)),
        user.id,
        connection,
    )?;

    create_debt(
        NewDebtForm {
            creditor_name: "XYZ Bank".to_owned(),
            description: Some("Credit card".to_owned()),
            total_amount: 1500.0,
            is_recurring: false,
            recurrence: None,
            start_date: today,
            due_date: today + Duration::days(15),
            priority: DebtPriority::High,
            category_id: None,
        },
        user.id,
        today,
        connection,
    )?;

    create_receivable(
        NewReceivableForm {
            debtor_name: "ABC Client".to_owned(),
            description: Some("Project payment".to_owned()),
            total_amount: 3000.0,
            due_date: today + Duration::days(30),
            category_id: None,
        },
        user.id,
        today,
        connection,
    )?;

    for (name, priority, estimated_price, note, target_date) in [
        ("New laptop", 5, 3500.0, "For work", Some(today + Duration::days(90))),
        ("Headphones", 3, 200.0, "For meetings", None),
    ] {
        create_wishlist_item(
            NewWishlistItemForm {
                name: name.to_owned(),
                priority,
                estimated_price: Some(estimated_price),
                utility_note: Some(note.to_owned()),
                target_date,
                status: WishlistStatus::Planned,
                purchase_links: Vec::new(),
            },
            None,
            user.id,
            connection,
        )?;
    }

    for (item_type, name, amount, day_of_month, category_id) in [
        (CategoryType::Income, "Salary", 5000.0, 5, Some(salary)),
        (CategoryType::Expense, "Rent", 1200.0, 10, Some(housing)),
    ] {
        create_recurring(
            item_type,
            NewRecurringForm {
                name: name.to_owned(),
                amount,
                day_of_month,
                start_date: today,
                end_date: None,
                active: true,
                category_id,
            },
            user.id,
            connection,
        )?;
    }

    let piggy_bank = create_piggy_bank(
        NewPiggyBankForm {
            name: "Emergency fund".to_owned(),
            description: Some("Six months of expenses".to_owned()),
            target_amount: Some(10000.0),
            amount_per_period: 250.0,
            period_type: PeriodType::Month,
        },
        None,
        user.id,
        connection,
    )?;
    add_transaction(
        piggy_bank.id,
        user.id,
        MovementForm {
            amount: 500.0,
            movement_type: MovementType::Deposit,
            description: Some("First deposit".to_owned()),
        },
        connection,
    )?;

    tracing::info!("created demo user {}", user.id);

    Ok(user)
}
