//! End-to-end reconciliation flow over an in-memory store:
//! seed transactions, build the session ledger, close and reconcile,
//! then verify the drawer balance chains into the next session.

use backoffice_server::db::repository::{cash_count, payment_method, session, SqliteFactSource};
use backoffice_server::db::{self, repository::RepoError};
use backoffice_server::reporting::facts::{LedgerFactSource, TimeRange};
use backoffice_server::reporting::pnl::{self, PnlInputs};
use backoffice_server::reporting::ledger;
use backoffice_server::reporting::reconcile::{self, CashFlowTotals};
use shared::models::{CountedAmount, SessionOpen, SessionState};
use sqlx::SqlitePool;

async fn seed_order(
    pool: &SqlitePool,
    order_ref: &str,
    channel: &str,
    state: &str,
    date_order: i64,
    amount_total: f64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO pos_order (order_ref, channel, state, date_order, amount_total) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(order_ref)
    .bind(channel)
    .bind(state)
    .bind(date_order)
    .bind(amount_total)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_payment(pool: &SqlitePool, order_id: i64, method_id: i64, amount: f64) {
    sqlx::query("INSERT INTO pos_payment (order_id, payment_method_id, amount) VALUES (?, ?, ?)")
        .bind(order_id)
        .bind(method_id)
        .bind(amount)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_line(
    pool: &SqlitePool,
    order_id: i64,
    product: &str,
    qty: f64,
    price_unit: f64,
    discount_percent: f64,
) {
    sqlx::query(
        "INSERT INTO pos_order_line (order_id, product_name, qty, price_unit, discount_percent) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(product)
    .bind(qty)
    .bind(price_unit)
    .bind(discount_percent)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_expense(
    pool: &SqlitePool,
    name: &str,
    category: &str,
    amount: f64,
    state: &str,
    method_id: Option<i64>,
    payment_date: Option<i64>,
    created_at: i64,
) {
    sqlx::query(
        "INSERT INTO expense (name, category, amount, state, payment_method_id, payment_date, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(category)
    .bind(amount)
    .bind(state)
    .bind(method_id)
    .bind(payment_date)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
}

async fn seed_purchase(
    pool: &SqlitePool,
    name: &str,
    amount_total: f64,
    state: &str,
    payment_status: &str,
    method_id: Option<i64>,
    date_order: i64,
    payment_date: Option<i64>,
) {
    sqlx::query(
        "INSERT INTO purchase_order (name, amount_total, state, payment_status, payment_method_id, date_order, payment_date) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(amount_total)
    .bind(state)
    .bind(payment_status)
    .bind(method_id)
    .bind(date_order)
    .bind(payment_date)
    .execute(pool)
    .await
    .unwrap();
}

struct Seeded {
    pool: SqlitePool,
    cash_id: i64,
    card_id: i64,
    session_id: i64,
    session_start: i64,
    event_time: i64,
}

/// Two orders (one split tender), one settled expense and one settled
/// purchase against the cash drawer, plus unpaid accrual records.
async fn seed_session_activity() -> Seeded {
    let pool = db::init_memory_pool().await.unwrap();

    let cash = payment_method::create(&pool, "Tiền mặt", true).await.unwrap();
    let card = payment_method::create(&pool, "Thẻ", false).await.unwrap();

    let opened = session::open(
        &pool,
        SessionOpen {
            name: "POS/2025/03/15/001".to_string(),
            operator_id: 1,
            operator_name: "Lan".to_string(),
            opening_cash: Some(200_000.0),
            note: None,
        },
    )
    .await
    .unwrap();

    let t = opened.start_time + 10;

    let o1 = seed_order(&pool, "POS/0001", "dine_in", "PAID", t, 150_000.0).await;
    seed_payment(&pool, o1, cash.id, 150_000.0).await;
    seed_line(&pool, o1, "Phở bò", 2.0, 50_000.0, 0.0).await;
    seed_line(&pool, o1, "Trà đá", 1.0, 50_000.0, 0.0).await;

    let o2 = seed_order(&pool, "POS/0002", "takeaway", "PAID", t, 80_000.0).await;
    seed_payment(&pool, o2, cash.id, 50_000.0).await;
    seed_payment(&pool, o2, card.id, 30_000.0).await;
    seed_line(&pool, o2, "Cơm gà", 2.0, 44_444.0, 10.0).await;

    // A draft order must never count
    seed_order(&pool, "POS/0003", "dine_in", "DRAFT", t, 999_000.0).await;

    seed_expense(
        &pool,
        "Mua rau",
        "Nguyên liệu",
        20_000.0,
        "PAID",
        Some(cash.id),
        Some(t),
        t,
    )
    .await;
    seed_expense(&pool, "Sửa quạt", "Khác", 10_000.0, "APPROVED", None, None, t).await;

    seed_purchase(
        &pool,
        "PO-1",
        30_000.0,
        "DONE",
        "PAID",
        Some(cash.id),
        t,
        Some(t),
    )
    .await;
    seed_purchase(&pool, "PO-2", 40_000.0, "PURCHASE", "UNPAID", None, t, None).await;

    Seeded {
        cash_id: cash.id,
        card_id: card.id,
        session_id: opened.id,
        session_start: opened.start_time,
        event_time: t,
        pool,
    }
}

#[tokio::test]
async fn fact_source_aggregates_completed_sales() {
    let seeded = seed_session_activity().await;
    let facts = SqliteFactSource::new(seeded.pool.clone());
    let range = TimeRange {
        start_millis: seeded.session_start,
        end_millis: seeded.event_time + 1_000,
    };

    let totals = facts.sales_totals(range).await.unwrap();
    assert_eq!(totals.total_amount, 230_000.0);
    assert_eq!(totals.order_count, 2);
    assert_eq!(totals.item_qty, 5.0);

    let by_method = facts.sales_by_payment_method(range).await.unwrap();
    assert_eq!(by_method.len(), 2);
    let cash = by_method.iter().find(|m| m.method_id == seeded.cash_id).unwrap();
    assert_eq!(cash.amount, 200_000.0);
    // Split-tender order counts once under each method
    assert_eq!(cash.order_count, 2);
    assert_eq!(cash.item_qty, 5.0);
    let card = by_method.iter().find(|m| m.method_id == seeded.card_id).unwrap();
    assert_eq!(card.amount, 30_000.0);
    assert_eq!(card.order_count, 1);
    assert_eq!(card.item_qty, 2.0);

    let channels = facts.sales_by_channel(range).await.unwrap();
    assert_eq!(channels.len(), 2);
    let dine_in = channels.iter().find(|c| c.channel == "dine_in").unwrap();
    assert_eq!(dine_in.order_count, 1);
    assert_eq!(dine_in.amount, 150_000.0);

    let orders = facts.completed_orders(range).await.unwrap();
    assert_eq!(orders.len(), 2);
    let split = orders.iter().find(|o| o.order_ref == "POS/0002").unwrap();
    assert_eq!(split.payments.len(), 2);
    assert_eq!(split.lines.len(), 1);
}

#[tokio::test]
async fn session_close_reconciles_and_chains_forward() {
    let seeded = seed_session_activity().await;
    let facts = SqliteFactSource::new(seeded.pool.clone());
    let methods = payment_method::find_active(&seeded.pool).await.unwrap();

    let stop_time = seeded.event_time + 1_000;
    let range = TimeRange {
        start_millis: seeded.session_start,
        end_millis: stop_time,
    };
    let session_ledger = ledger::build_for_range(&facts, &methods, range, 200_000.0)
        .await
        .unwrap();

    // Cash: 200k opening + 200k income - 20k expense - 30k purchase
    let cash_row = session_ledger.rows.iter().find(|r| r.is_cash).unwrap();
    assert_eq!(cash_row.closing_balance, 350_000.0);
    let card_row = session_ledger.rows.iter().find(|r| !r.is_cash).unwrap();
    assert_eq!(card_row.closing_balance, 30_000.0);

    let counted = vec![
        CountedAmount {
            payment_method_id: seeded.cash_id,
            counted_amount: 340_000.0,
        },
        CountedAmount {
            payment_method_id: seeded.card_id,
            counted_amount: 30_000.0,
        },
    ];
    let records =
        reconcile::build_count_records(seeded.session_id, &session_ledger, &counted, 300_000.0);
    let saved = cash_count::insert_for_session(&seeded.pool, &records)
        .await
        .unwrap();
    assert_eq!(saved.len(), 2);

    let closed = session::close(&seeded.pool, seeded.session_id, stop_time, 300_000.0, None)
        .await
        .unwrap();
    assert_eq!(closed.state, SessionState::Closed);
    assert_eq!(closed.stop_time, Some(stop_time));

    let cash_saved = saved.iter().find(|r| r.is_cash).unwrap();
    assert_eq!(cash_saved.expected_amount, 350_000.0);
    assert_eq!(cash_saved.difference, -10_000.0);
    assert_eq!(cash_saved.owner_withdrawal, 300_000.0);
    assert_eq!(cash_saved.next_session_opening, 40_000.0);
    let card_saved = saved.iter().find(|r| !r.is_cash).unwrap();
    assert_eq!(card_saved.owner_withdrawal, 0.0);
    assert_eq!(card_saved.next_session_opening, 0.0);

    // Re-reconciling the same session is rejected by the unique key
    let duplicate = cash_count::insert_for_session(&seeded.pool, &records).await;
    assert!(matches!(duplicate, Err(RepoError::Duplicate(_))));

    // The next session inherits the leftover drawer cash
    let prior = cash_count::find_latest_cash_count(&seeded.pool, stop_time + 1)
        .await
        .unwrap();
    assert_eq!(ledger::carry_forward_opening(prior.as_ref()), 40_000.0);

    // Opening without an explicit amount inherits it too
    let next = session::open(
        &seeded.pool,
        SessionOpen {
            name: "POS/2025/03/16/001".to_string(),
            operator_id: 1,
            operator_name: "Lan".to_string(),
            opening_cash: None,
            note: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(next.opening_cash, 40_000.0);

    // And the window rollup feeds the P&L cash-flow block
    let totals = cash_count::window_totals_by_method(
        &seeded.pool,
        seeded.session_start - 1,
        stop_time + 1,
    )
    .await
    .unwrap();
    assert_eq!(totals.len(), 2);
    let flow = CashFlowTotals::accumulate(totals.iter().map(|m| (m.expected, m.counted)));
    assert_eq!(flow.expected, 380_000.0);
    assert_eq!(flow.counted, 370_000.0);
    assert_eq!(flow.difference, -10_000.0);
    assert_eq!(flow.variance_pct, -2.63);
}

#[tokio::test]
async fn accrual_pnl_includes_unpaid_obligations() {
    let seeded = seed_session_activity().await;
    let facts = SqliteFactSource::new(seeded.pool.clone());
    let range = TimeRange {
        start_millis: seeded.session_start,
        end_millis: seeded.event_time + 1_000,
    };

    let (cogs_paid, cogs_unpaid) = facts.purchase_cost_split(range).await.unwrap();
    assert_eq!(cogs_paid, 30_000.0);
    assert_eq!(cogs_unpaid, 40_000.0);

    let categories = facts.expense_categories(range).await.unwrap();
    assert_eq!(categories.len(), 2);
    let materials = categories.iter().find(|c| c.name == "Nguyên liệu").unwrap();
    assert_eq!(materials.paid, 20_000.0);
    assert_eq!(materials.unpaid, 0.0);
    let other = categories.iter().find(|c| c.name == "Khác").unwrap();
    assert_eq!(other.unpaid, 10_000.0);

    let totals = facts.sales_totals(range).await.unwrap();
    let snapshot = pnl::compute(
        &PnlInputs {
            revenue: totals.total_amount,
            order_count: totals.order_count,
            cogs_paid,
            cogs_unpaid,
            categories,
        },
        pnl::DEFAULT_TAX_RATE,
    );

    assert_eq!(snapshot.cogs, 70_000.0);
    assert_eq!(snapshot.gross_profit, 160_000.0);
    assert_eq!(snapshot.operating_expenses, 30_000.0);
    assert_eq!(snapshot.profit_before_tax, 130_000.0);
    assert_eq!(snapshot.tax, 26_000.0);
    assert_eq!(snapshot.net_profit, 104_000.0);
}

#[tokio::test]
async fn repeated_runs_over_unchanged_facts_are_identical() {
    let seeded = seed_session_activity().await;
    let facts = SqliteFactSource::new(seeded.pool.clone());
    let methods = payment_method::find_active(&seeded.pool).await.unwrap();
    let range = TimeRange {
        start_millis: seeded.session_start,
        end_millis: seeded.event_time + 1_000,
    };

    let first = ledger::build_for_range(&facts, &methods, range, 200_000.0)
        .await
        .unwrap();
    let second = ledger::build_for_range(&facts, &methods, range, 200_000.0)
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let mut snapshots = Vec::new();
    for _ in 0..2 {
        let totals = facts.sales_totals(range).await.unwrap();
        let (cogs_paid, cogs_unpaid) = facts.purchase_cost_split(range).await.unwrap();
        let categories = facts.expense_categories(range).await.unwrap();
        let snapshot = pnl::compute(
            &PnlInputs {
                revenue: totals.total_amount,
                order_count: totals.order_count,
                cogs_paid,
                cogs_unpaid,
                categories,
            },
            pnl::DEFAULT_TAX_RATE,
        );
        snapshots.push(serde_json::to_string(&snapshot).unwrap());
    }
    assert_eq!(snapshots[0], snapshots[1]);
}

#[tokio::test]
async fn file_backed_pool_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backoffice.db");
    let pool = db::init_pool(&path.to_string_lossy()).await.unwrap();
    payment_method::create(&pool, "Tiền mặt", true).await.unwrap();
    pool.close().await;

    let reopened = db::init_pool(&path.to_string_lossy()).await.unwrap();
    let methods = payment_method::find_active(&reopened).await.unwrap();
    assert_eq!(methods.len(), 1);
    assert!(methods[0].is_cash_equivalent);
}

#[tokio::test]
async fn only_one_session_may_be_open() {
    let seeded = seed_session_activity().await;
    let second = session::open(
        &seeded.pool,
        SessionOpen {
            name: "POS/2025/03/15/002".to_string(),
            operator_id: 2,
            operator_name: "Minh".to_string(),
            opening_cash: Some(0.0),
            note: None,
        },
    )
    .await;
    assert!(matches!(second, Err(RepoError::Duplicate(_))));
}
