//! The two entities under test.
//!
//! `parent` owns a one-to-many association to `child`; the child's foreign
//! key is declared with `on_delete = "Cascade"`, so destroying a parent row
//! removes its children at the database level. The child registers an
//! after-delete lifecycle hook that reports into [`crate::spy::destroy_spy`].

pub mod parent {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "parent")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::child::Entity")]
        Child,
    }

    impl Related<super::child::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Child.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod child {
    use sea_orm::entity::prelude::*;

    use crate::spy;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "child")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub parent_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::parent::Entity",
            from = "Column::ParentId",
            to = "super::parent::Column::Id",
            on_delete = "Cascade"
        )]
        Parent,
    }

    impl Related<super::parent::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Parent.def()
        }
    }

    #[async_trait::async_trait]
    impl ActiveModelBehavior for ActiveModel {
        /// Fires once per row deleted *through the ORM*. Rows removed by the
        /// database's `ON DELETE CASCADE` never reach this hook, which is the
        /// behavior this crate reproduces.
        async fn after_delete<C>(self, _db: &C) -> Result<Self, DbErr>
        where
            C: ConnectionTrait,
        {
            spy::destroy_spy().call();
            Ok(self)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use sea_orm::{DbBackend, ModelTrait, QueryTrait, Schema};

    use super::{child, parent};

    #[test]
    fn child_table_cascades_on_parent_delete() {
        let schema = Schema::new(DbBackend::Sqlite);
        let ddl = DbBackend::Sqlite
            .build(&schema.create_table_from_entity(child::Entity))
            .to_string();

        assert!(ddl.contains("FOREIGN KEY"), "missing foreign key: {ddl}");
        assert!(ddl.contains("ON DELETE CASCADE"), "missing cascade: {ddl}");
    }

    #[test]
    fn find_related_joins_children_through_the_foreign_key() {
        let model = parent::Model {
            id: 7,
            name: String::new(),
        };

        assert_eq!(
            model
                .find_related(child::Entity)
                .build(DbBackend::MySql)
                .to_string(),
            [
                "SELECT `child`.`id`, `child`.`parent_id`",
                "FROM `child`",
                "INNER JOIN `parent` ON `parent`.`id` = `child`.`parent_id`",
                "WHERE `parent`.`id` = 7",
            ]
            .join(" ")
        );
    }
}
