use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::products::{ActiveModel, Column, Entity as Products, Model},
    error::AppResult,
    repository::{NewProduct, ProductRepository},
    routes::params::{ProductQuery, ProductSort},
};

#[derive(Clone)]
pub struct SeaOrmProductRepository {
    conn: OrmConn,
}

impl SeaOrmProductRepository {
    pub fn new(conn: OrmConn) -> Self {
        Self { conn }
    }
}

impl ProductRepository for SeaOrmProductRepository {
    async fn insert(&self, product: &NewProduct) -> AppResult<Model> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(product.name.clone()),
            price: Set(product.price),
            description: Set(product.description.clone()),
            user_id: Set(product.user_id),
            created_by: Set(product.created_by.clone()),
            created_at: NotSet,
        };
        let model = active.insert(&self.conn).await?;
        Ok(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Model>> {
        let model = Products::find_by_id(id).one(&self.conn).await?;
        Ok(model)
    }

    async fn search(&self, query: &ProductQuery) -> AppResult<(Vec<Model>, i64)> {
        let (_, limit, offset) = query.pagination.normalize();
        let mut condition = Condition::all();

        if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            condition = condition.add(Expr::col(Column::Name).ilike(pattern));
        }

        if let Some(min_price) = query.min_price {
            condition = condition.add(Column::Price.gte(min_price));
        }

        if let Some(max_price) = query.max_price {
            condition = condition.add(Column::Price.lte(max_price));
        }

        let mut finder = Products::find().filter(condition);
        finder = match query.sort.unwrap_or(ProductSort::PriceAsc) {
            ProductSort::PriceAsc => finder.order_by_asc(Column::Price),
            ProductSort::PriceDesc => finder.order_by_desc(Column::Price),
        };

        let total = finder.clone().count(&self.conn).await? as i64;

        let items = finder
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.conn)
            .await?;

        Ok((items, total))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Products::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
