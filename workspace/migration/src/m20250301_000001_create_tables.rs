use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create usuarios table
        manager
            .create_table(
                Table::create()
                    .table(Usuarios::Table)
                    .if_not_exists()
                    .col(pk_auto(Usuarios::Id))
                    .col(string(Usuarios::Nome))
                    .col(string(Usuarios::Email).unique_key())
                    .col(string(Usuarios::Senha))
                    .to_owned(),
            )
            .await?;

        // Create escolas table
        manager
            .create_table(
                Table::create()
                    .table(Escolas::Table)
                    .if_not_exists()
                    .col(pk_auto(Escolas::Id))
                    .col(string(Escolas::Nome))
                    .col(integer(Escolas::UsuarioId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escola_usuario")
                            .from(Escolas::Table, Escolas::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_escolas_usuario_nome")
                    .table(Escolas::Table)
                    .col(Escolas::UsuarioId)
                    .col(Escolas::Nome)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create mercadorias table
        manager
            .create_table(
                Table::create()
                    .table(Mercadorias::Table)
                    .if_not_exists()
                    .col(pk_auto(Mercadorias::Id))
                    .col(string(Mercadorias::Nome))
                    .col(integer(Mercadorias::UsuarioId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mercadoria_usuario")
                            .from(Mercadorias::Table, Mercadorias::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_mercadorias_usuario_nome")
                    .table(Mercadorias::Table)
                    .col(Mercadorias::UsuarioId)
                    .col(Mercadorias::Nome)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create descricoes table
        manager
            .create_table(
                Table::create()
                    .table(Descricoes::Table)
                    .if_not_exists()
                    .col(pk_auto(Descricoes::Id))
                    .col(string(Descricoes::Texto))
                    .col(integer(Descricoes::UsuarioId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_descricao_usuario")
                            .from(Descricoes::Table, Descricoes::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_descricoes_usuario_texto")
                    .table(Descricoes::Table)
                    .col(Descricoes::UsuarioId)
                    .col(Descricoes::Texto)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create entregas table.
        // escola_id and mercadoria_id deliberately carry no foreign key:
        // deleting a school or good must leave existing delivery rows in
        // place with a dangling id.
        manager
            .create_table(
                Table::create()
                    .table(Entregas::Table)
                    .if_not_exists()
                    .col(pk_auto(Entregas::Id))
                    .col(integer(Entregas::EscolaId))
                    .col(integer(Entregas::MercadoriaId))
                    .col(date(Entregas::Data))
                    .col(integer(Entregas::Quantidade))
                    .col(integer(Entregas::UsuarioId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entrega_usuario")
                            .from(Entregas::Table, Entregas::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create lancamentos table. Good and description are literal label
        // text, not references; escola_id has no foreign key (same dangling
        // behavior as entregas).
        manager
            .create_table(
                Table::create()
                    .table(Lancamentos::Table)
                    .if_not_exists()
                    .col(pk_auto(Lancamentos::Id))
                    .col(integer(Lancamentos::EscolaId))
                    .col(date(Lancamentos::Data))
                    .col(string(Lancamentos::Mercadoria))
                    .col(string(Lancamentos::Descricao))
                    .col(decimal_null(Lancamentos::Debito).decimal_len(16, 4).to_owned())
                    .col(decimal_null(Lancamentos::Credito).decimal_len(16, 4).to_owned())
                    .col(integer(Lancamentos::UsuarioId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lancamento_usuario")
                            .from(Lancamentos::Table, Lancamentos::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lancamentos::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Entregas::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Descricoes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Mercadorias::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Escolas::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Usuarios::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Usuarios {
    Table,
    Id,
    Nome,
    Email,
    Senha,
}

#[derive(DeriveIden)]
enum Escolas {
    Table,
    Id,
    Nome,
    UsuarioId,
}

#[derive(DeriveIden)]
enum Mercadorias {
    Table,
    Id,
    Nome,
    UsuarioId,
}

#[derive(DeriveIden)]
enum Descricoes {
    Table,
    Id,
    Texto,
    UsuarioId,
}

#[derive(DeriveIden)]
enum Entregas {
    Table,
    Id,
    EscolaId,
    MercadoriaId,
    Data,
    Quantidade,
    UsuarioId,
}

#[derive(DeriveIden)]
enum Lancamentos {
    Table,
    Id,
    EscolaId,
    Data,
    Mercadoria,
    Descricao,
    Debito,
    Credito,
    UsuarioId,
}
