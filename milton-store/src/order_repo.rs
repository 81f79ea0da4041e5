use async_trait::async_trait;
use chrono::{DateTime, Utc};
use milton_catalog::Tour;
use milton_core::{ContactDetails, CoreError, CoreResult, FieldErrors};
use milton_order::models::DEFAULT_LINE_QTY;
use milton_order::{Order, OrderLine, OrderRepository, OrderStatus};
use milton_shared::Masked;
use rust_decimal::Decimal;
use crate::database::DbClient;

pub struct PgOrderRepository {
    db: DbClient,
}

impl PgOrderRepository {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    status: bool,
    first_name: String,
    surname: String,
    email: String,
    phone: String,
    total_cost: Decimal,
    date: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    line_id: i64,
    qty: i32,
    tour_id: i64,
    city_id: i64,
    name: String,
    description: String,
    image: String,
    price: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.line_id,
            qty: row.qty,
            tour: Tour {
                id: row.tour_id,
                city_id: row.city_id,
                name: row.name,
                description: row.description,
                image: row.image,
                price: row.price,
            },
        }
    }
}

// Oldest open-order line for a tour; removal and quantity edits target it.
const OLDEST_LINE: &str = r#"
    SELECT l.id FROM order_lines l
    JOIN orders o ON o.id = l.order_id
    WHERE l.order_id = $1 AND l.tour_id = $2 AND o.status = FALSE
    ORDER BY l.id
    LIMIT 1
"#;

fn line_not_found(order_id: i64, tour_id: i64) -> CoreError {
    CoreError::not_found(format!("tour {} in order {}", tour_id, order_id))
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn get(&self, order_id: i64) -> CoreResult<Option<Order>> {
        let order_row = self
            .db
            .bounded(
                "get_order",
                sqlx::query_as::<_, OrderRow>(
                    r#"
                    SELECT id, status, first_name, surname, email, phone, total_cost, date
                    FROM orders
                    WHERE id = $1
                    "#,
                )
                .bind(order_id)
                .fetch_optional(&self.db.pool),
            )
            .await?;

        let Some(row) = order_row else {
            return Ok(None);
        };

        let line_rows = self
            .db
            .bounded(
                "get_order_lines",
                sqlx::query_as::<_, OrderLineRow>(
                    r#"
                    SELECT l.id AS line_id, l.qty, t.id AS tour_id, t.city_id,
                           t.name, t.description, t.image, t.price
                    FROM order_lines l
                    JOIN tours t ON t.id = l.tour_id
                    WHERE l.order_id = $1
                    ORDER BY l.id
                    "#,
                )
                .bind(order_id)
                .fetch_all(&self.db.pool),
            )
            .await?;

        Ok(Some(Order {
            id: row.id,
            status: OrderStatus::from_flag(row.status),
            contact: ContactDetails {
                first_name: row.first_name,
                surname: row.surname,
                email: Masked(row.email),
                phone: Masked(row.phone),
            },
            total_cost: row.total_cost,
            date: row.date,
            lines: line_rows.into_iter().map(OrderLine::from).collect(),
        }))
    }

    async fn create(&self) -> CoreResult<i64> {
        let draft = Order::new(0);
        self.db
            .bounded(
                "create_order",
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO orders (status, first_name, surname, email, phone, total_cost, date)
                    VALUES ($1, '', '', '', '', $2, $3)
                    RETURNING id
                    "#,
                )
                .bind(draft.status.as_flag())
                .bind(draft.total_cost)
                .bind(draft.date)
                .fetch_one(&self.db.pool),
            )
            .await
    }

    async fn add_tour(&self, order_id: i64, tour_id: i64) -> CoreResult<()> {
        let result = self
            .db
            .bounded(
                "add_tour",
                sqlx::query(
                    r#"
                    INSERT INTO order_lines (order_id, tour_id, qty)
                    SELECT o.id, t.id, $3
                    FROM orders o
                    JOIN tours t ON t.id = $2
                    WHERE o.id = $1 AND o.status = FALSE
                    "#,
                )
                .bind(order_id)
                .bind(tour_id)
                .bind(DEFAULT_LINE_QTY)
                .execute(&self.db.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!("order {} or tour {}", order_id, tour_id)));
        }
        Ok(())
    }

    async fn remove_tour(&self, order_id: i64, tour_id: i64) -> CoreResult<()> {
        let sql = format!("DELETE FROM order_lines WHERE id = ({})", OLDEST_LINE);
        let result = self
            .db
            .bounded(
                "remove_tour",
                sqlx::query(&sql)
                    .bind(order_id)
                    .bind(tour_id)
                    .execute(&self.db.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(line_not_found(order_id, tour_id));
        }
        Ok(())
    }

    async fn set_quantity(&self, order_id: i64, tour_id: i64, qty: i32) -> CoreResult<()> {
        if qty < 1 {
            let mut errors = FieldErrors::default();
            errors.push("qty", "Must be at least 1");
            return Err(CoreError::Validation(errors));
        }

        let sql = format!("UPDATE order_lines SET qty = $3 WHERE id = ({})", OLDEST_LINE);
        let result = self
            .db
            .bounded(
                "set_quantity",
                sqlx::query(&sql)
                    .bind(order_id)
                    .bind(tour_id)
                    .bind(qty)
                    .execute(&self.db.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(line_not_found(order_id, tour_id));
        }
        Ok(())
    }

    async fn update_total(&self, order_id: i64, total_cost: Decimal) -> CoreResult<()> {
        let result = self
            .db
            .bounded(
                "update_total",
                sqlx::query("UPDATE orders SET total_cost = $2 WHERE id = $1 AND status = FALSE")
                    .bind(order_id)
                    .bind(total_cost)
                    .execute(&self.db.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!("order {}", order_id)));
        }
        Ok(())
    }

    async fn delete(&self, order_id: i64) -> CoreResult<bool> {
        let result = self
            .db
            .bounded(
                "delete_order",
                sqlx::query("DELETE FROM orders WHERE id = $1")
                    .bind(order_id)
                    .execute(&self.db.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn finalize(
        &self,
        order_id: i64,
        contact: &ContactDetails,
        total_cost: Decimal,
        timestamp: DateTime<Utc>,
    ) -> CoreResult<()> {
        let pool = &self.db.pool;
        let updated = self
            .db
            .bounded("finalize_order", async move {
                let mut tx = pool.begin().await?;

                let result = sqlx::query(
                    r#"
                    UPDATE orders
                    SET status = TRUE, first_name = $2, surname = $3, email = $4, phone = $5,
                        total_cost = $6, date = $7
                    WHERE id = $1 AND status = FALSE
                    "#,
                )
                .bind(order_id)
                .bind(&contact.first_name)
                .bind(&contact.surname)
                .bind(contact.email.expose())
                .bind(contact.phone.expose())
                .bind(total_cost)
                .bind(timestamp)
                .execute(&mut *tx)
                .await?;

                // Dropping the transaction without commit rolls it back.
                if result.rows_affected() == 0 {
                    return Ok::<u64, sqlx::Error>(0);
                }

                tx.commit().await?;
                Ok::<u64, sqlx::Error>(result.rows_affected())
            })
            .await?;

        if updated == 0 {
            return Err(CoreError::not_found(format!("open order {}", order_id)));
        }
        Ok(())
    }
}
