use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::cart::{ActiveModel, Column, Entity as Cart, Model},
    error::AppResult,
    repository::{CartRepository, NewCartLine},
};

#[derive(Clone)]
pub struct SeaOrmCartRepository {
    conn: OrmConn,
}

impl SeaOrmCartRepository {
    pub fn new(conn: OrmConn) -> Self {
        Self { conn }
    }
}

impl CartRepository for SeaOrmCartRepository {
    async fn lines_for_user(&self, user_id: i32) -> AppResult<Vec<Model>> {
        let lines = Cart::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::AddedAt)
            .all(&self.conn)
            .await?;
        Ok(lines)
    }

    async fn find_line(&self, user_id: i32, product_id: &str) -> AppResult<Option<Model>> {
        let line = Cart::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ProductId.eq(product_id))
            .one(&self.conn)
            .await?;
        Ok(line)
    }

    async fn find_line_by_id(&self, id: Uuid, user_id: i32) -> AppResult<Option<Model>> {
        let line = Cart::find()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?;
        Ok(line)
    }

    async fn insert_line(&self, line: &NewCartLine) -> AppResult<Model> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(line.user_id),
            product_id: Set(line.product_id.clone()),
            name: Set(line.name.clone()),
            price: Set(line.price),
            quantity: Set(1),
            added_at: NotSet,
        };
        let model = active.insert(&self.conn).await?;
        Ok(model)
    }

    async fn increment_quantity(&self, id: Uuid) -> AppResult<()> {
        Cart::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).add(1))
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn set_quantity(&self, id: Uuid, user_id: i32, quantity: i32) -> AppResult<bool> {
        let result = Cart::update_many()
            .col_expr(Column::Quantity, Expr::value(quantity))
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_line(&self, id: Uuid, user_id: i32) -> AppResult<bool> {
        let result = Cart::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear_user(&self, user_id: i32) -> AppResult<u64> {
        let result = Cart::delete_many()
            .filter(Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }
}
