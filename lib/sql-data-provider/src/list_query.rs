use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use vault_core::model::list_query::PageCursor;

pub(crate) trait SelectAfterCursor {
    /// Keyset pagination on `(sort_key, id)`, ascending
    fn after_cursor<C: ColumnTrait>(
        self,
        sort_key: C,
        id: C,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Self;
}

impl<E: EntityTrait> SelectAfterCursor for Select<E> {
    fn after_cursor<C: ColumnTrait>(
        self,
        sort_key: C,
        id: C,
        after: Option<PageCursor>,
        limit: u64,
    ) -> Self {
        let query = match after {
            None => self,
            Some(cursor) => self.filter(
                Condition::any().add(sort_key.gt(cursor.sort_key)).add(
                    Condition::all()
                        .add(sort_key.eq(cursor.sort_key))
                        .add(id.gt(cursor.id)),
                ),
            ),
        };

        query
            .order_by_asc(sort_key)
            .order_by_asc(id)
            .limit(limit)
    }
}
