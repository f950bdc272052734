use common::DeliveryTotal;
use model::entities::{delivery, good};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::error::Result;

/// Total quantity delivered per good for the dashboard chart, ordered by
/// good id. Only goods with at least one delivery appear; deliveries whose
/// good was deleted drop out.
#[instrument(skip(db))]
pub async fn totals_by_good(db: &DatabaseConnection, owner_id: i32) -> Result<Vec<DeliveryTotal>> {
    let goods = good::Entity::find()
        .filter(good::Column::OwnerId.eq(owner_id))
        .order_by_asc(good::Column::Id)
        .all(db)
        .await?;

    let deliveries = delivery::Entity::find()
        .filter(delivery::Column::OwnerId.eq(owner_id))
        .all(db)
        .await?;

    debug!(
        "Aggregating {} deliveries across {} goods for owner_id={}",
        deliveries.len(),
        goods.len(),
        owner_id
    );

    let mut totals: HashMap<i32, i64> = HashMap::new();
    for d in &deliveries {
        *totals.entry(d.good_id).or_insert(0) += i64::from(d.quantity);
    }

    Ok(goods
        .into_iter()
        .filter_map(|g| {
            totals.get(&g.id).map(|total| DeliveryTotal {
                good: g.name,
                total_quantity: *total,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{insert_delivery, insert_good, insert_school, insert_user, setup_db};
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn totals_sum_per_good_and_skip_undelivered_goods() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let school = insert_school(&db, owner, "Escola Azul").await;
        let rice = insert_good(&db, owner, "Arroz").await;
        let beans = insert_good(&db, owner, "Feijão").await;
        let _never_delivered = insert_good(&db, owner, "Leite").await;

        insert_delivery(&db, owner, school, rice, date(1), 5).await;
        insert_delivery(&db, owner, school, rice, date(2), 7).await;
        insert_delivery(&db, owner, school, beans, date(1), 3).await;

        let totals = totals_by_good(&db, owner).await.unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].good, "Arroz");
        assert_eq!(totals[0].total_quantity, 12);
        assert_eq!(totals[1].good, "Feijão");
        assert_eq!(totals[1].total_quantity, 3);
    }

    #[tokio::test]
    async fn totals_are_scoped_to_the_owner() {
        let db = setup_db().await;
        let owner = insert_user(&db, "a@example.com").await;
        let other = insert_user(&db, "b@example.com").await;
        let school = insert_school(&db, owner, "Escola Azul").await;
        let other_school = insert_school(&db, other, "Escola Azul").await;
        let rice = insert_good(&db, owner, "Arroz").await;
        let other_rice = insert_good(&db, other, "Arroz").await;

        insert_delivery(&db, owner, school, rice, date(1), 5).await;
        insert_delivery(&db, other, other_school, other_rice, date(1), 50).await;

        let totals = totals_by_good(&db, owner).await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_quantity, 5);
    }
}
