use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;

use hoard_index::Index;
use hoard_objects::{Object, ObjectKind, Tag, Tree};
use hoard_refs::{RefDb, RefNode, RefTree};
use hoard_repo::Repository;
use hoard_store::Odb;
use hoard_types::ObjectId;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => cmd_init(args),
        Command::CatFile(args) => cmd_cat_file(args),
        Command::HashObject(args) => cmd_hash_object(args),
        Command::LsTree(args) => cmd_ls_tree(args),
        Command::Checkout(args) => cmd_checkout(args),
        Command::ShowRef(_) => cmd_show_ref(),
        Command::Tag(args) => cmd_tag(args),
        Command::LsFiles(args) => cmd_ls_files(args),
    }
}

fn open_repo() -> anyhow::Result<Repository> {
    Repository::discover(".").context("not inside a repository")
}

/// Resolves a user-supplied object name: a full hex hash, or a
/// reference name tried against the usual prefixes.
fn resolve_name(refs: &RefDb, name: &str) -> anyhow::Result<ObjectId> {
    if let Ok(id) = ObjectId::from_hex(name) {
        return Ok(id);
    }
    let candidates = [
        name.to_string(),
        format!("refs/{name}"),
        format!("refs/tags/{name}"),
        format!("refs/heads/{name}"),
    ];
    for candidate in &candidates {
        if let Some(hash) = refs.resolve(candidate)? {
            return ObjectId::from_hex(&hash)
                .with_context(|| format!("reference {candidate:?} holds an invalid hash"));
        }
    }
    bail!("no object or reference named {name:?}");
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let path = args.path.unwrap_or_else(|| ".".into());
    Repository::init(&path)?;
    println!(
        "{} Initialized empty repository in {}",
        "✓".green().bold(),
        path.bold()
    );
    Ok(())
}

fn cmd_cat_file(args: CatFileArgs) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let odb = Odb::new(repo.objects_dir());
    let refs = RefDb::new(repo.meta_dir());

    let id = resolve_name(&refs, &args.object)?;
    let object = odb.read(&id)?;

    if args.show_type {
        println!("{}", object.kind());
    } else {
        std::io::stdout().lock().write_all(&object.serialize())?;
    }
    Ok(())
}

fn cmd_hash_object(args: HashObjectArgs) -> anyhow::Result<()> {
    let kind: ObjectKind = args.object_type.parse()?;
    // Repository lookup only matters when persisting; hashing alone
    // never touches the database root.
    let odb = if args.write {
        Odb::new(open_repo()?.objects_dir())
    } else {
        Odb::new(PathBuf::new())
    };
    let id = odb.hash_file(Path::new(&args.path), kind, args.write)?;
    println!("{id}");
    Ok(())
}

fn cmd_ls_tree(args: LsTreeArgs) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let odb = Odb::new(repo.objects_dir());
    let refs = RefDb::new(repo.meta_dir());

    let id = resolve_name(&refs, &args.tree)?;
    ls_tree(&odb, id, args.recursive, "")
}

fn ls_tree(odb: &Odb, id: ObjectId, recursive: bool, prefix: &str) -> anyhow::Result<()> {
    let tree = match odb.read(&id)? {
        Object::Tree(tree) => tree,
        // A commit names its root tree; listing one lists that tree.
        Object::Commit(commit) => return ls_tree(odb, commit.tree(), recursive, prefix),
        other => bail!("{} is a {}, not a tree", id, other.kind()),
    };

    for entry in tree.entries() {
        let kind = entry.kind()?;
        let path = if prefix.is_empty() {
            entry.path().to_string()
        } else {
            format!("{prefix}/{}", entry.path())
        };
        if recursive && kind == ObjectKind::Tree {
            ls_tree(odb, entry.id(), recursive, &path)?;
        } else {
            println!("{} {} {} {}", kind, entry.canonical_mode(), entry.id(), path);
        }
    }
    Ok(())
}

fn cmd_checkout(args: CheckoutArgs) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let odb = Odb::new(repo.objects_dir());
    let refs = RefDb::new(repo.meta_dir());

    let id = resolve_name(&refs, &args.commit)?;
    let tree = match odb.read(&id)? {
        Object::Commit(commit) => match odb.read(&commit.tree())? {
            Object::Tree(tree) => tree,
            other => bail!("commit {} names a {}, not a tree", id, other.kind()),
        },
        Object::Tree(tree) => tree,
        other => bail!("{} is a {}, not a commit", id, other.kind()),
    };

    let dest = Path::new(&args.path);
    if dest.exists() {
        if !dest.is_dir() {
            bail!("{:?} is not a directory", dest);
        }
        if fs::read_dir(dest)?.next().is_some() {
            bail!("{:?} is not empty", dest);
        }
    } else {
        fs::create_dir_all(dest)?;
    }

    checkout_tree(&odb, &tree, dest)?;
    println!(
        "{} Checked out {} into {}",
        "✓".green().bold(),
        id.short_hex().yellow(),
        args.path.bold()
    );
    Ok(())
}

fn checkout_tree(odb: &Odb, tree: &Tree, dest: &Path) -> anyhow::Result<()> {
    for entry in tree.entries() {
        let target = dest.join(entry.path());
        match odb.read(&entry.id())? {
            Object::Tree(subtree) => {
                fs::create_dir(&target)?;
                checkout_tree(odb, &subtree, &target)?;
            }
            Object::Blob(blob) => {
                fs::write(&target, blob.data())?;
            }
            // Submodule and tag entries have no on-disk form here.
            Object::Commit(_) | Object::Tag(_) => {}
        }
    }
    Ok(())
}

fn cmd_show_ref() -> anyhow::Result<()> {
    let repo = open_repo()?;
    let refs = RefDb::new(repo.meta_dir());
    for line in ref_lines(&refs.list()?, true, "refs") {
        println!("{line}");
    }
    Ok(())
}

/// Flattens a reference tree into display lines, depth first. An empty
/// prefix yields bare names, as the tag listing wants.
fn ref_lines(tree: &RefTree, with_hash: bool, prefix: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, node) in tree.iter() {
        let full = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };
        match node {
            RefNode::Hash(hash) => {
                if with_hash {
                    lines.push(format!("{hash} {full}"));
                } else {
                    lines.push(full);
                }
            }
            RefNode::Nested(sub) => lines.extend(ref_lines(sub, with_hash, &full)),
        }
    }
    lines
}

fn cmd_tag(args: TagArgs) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let refs = RefDb::new(repo.meta_dir());

    let Some(name) = args.name else {
        let tags = refs.list_at("refs/tags")?;
        if tags.is_empty() {
            println!("No tags.");
        } else {
            for line in ref_lines(&tags, false, "") {
                println!("{line}");
            }
        }
        return Ok(());
    };

    let target = refs
        .resolve("HEAD")?
        .context("HEAD does not point at a commit yet")?;

    if args.annotate {
        let odb = Odb::new(repo.objects_dir());
        let tag = Tag::annotated(&name, &target, &args.tagger, &args.message);
        let tag_id = odb.write(&Object::Tag(tag), true)?;
        refs.create(&format!("tags/{name}"), &tag_id.to_hex())?;
        println!("Created tag {} ({})", name.yellow(), tag_id.short_hex().dimmed());
    } else {
        refs.create(&format!("tags/{name}"), &target)?;
        println!("Created tag {}", name.yellow());
    }
    Ok(())
}

fn cmd_ls_files(args: LsFilesArgs) -> anyhow::Result<()> {
    let repo = open_repo()?;
    let index = Index::read(repo.index_path()).context("failed to read the staging index")?;

    if args.verbose {
        println!(
            "Index version {}, containing {} entries",
            index.version,
            index.entries.len()
        );
    }

    for entry in &index.entries {
        println!("{}", entry.name);
        if args.verbose {
            println!("  {} with perms: {:o}", entry.entry_type, entry.perms);
            println!(
                "  created: {}.{}, modified: {}.{}",
                format_time(entry.ctime),
                entry.ctime.1,
                format_time(entry.mtime),
                entry.mtime.1
            );
            println!("  user: {} group: {}", entry.uid, entry.gid);
            println!(
                "  flags: stage={} assume_valid={}",
                entry.stage, entry.assume_valid
            );
        }
    }
    Ok(())
}

fn format_time((secs, nanos): (u32, u32)) -> String {
    match chrono::DateTime::from_timestamp(i64::from(secs), nanos) {
        Some(when) => when.to_rfc3339(),
        None => format!("@{secs}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HASH_A: &str = "9daeafb9864cf43055ae93beb0afd6c7d144bfa4";
    const HASH_B: &str = "af5626b4a114abcb82d63db7c8082c3c4756e51b";

    fn seeded_refs(dir: &TempDir) -> RefDb {
        let refs = RefDb::new(dir.path());
        refs.create("heads/master", HASH_A).unwrap();
        refs.create("tags/v1", HASH_B).unwrap();
        refs.create("tags/release/v2", HASH_A).unwrap();
        refs
    }

    #[test]
    fn ref_lines_with_hashes_and_prefix() {
        let dir = TempDir::new().unwrap();
        let refs = seeded_refs(&dir);
        let lines = ref_lines(&refs.list().unwrap(), true, "refs");
        assert_eq!(
            lines,
            vec![
                format!("{HASH_A} refs/heads/master"),
                format!("{HASH_A} refs/tags/release/v2"),
                format!("{HASH_B} refs/tags/v1"),
            ]
        );
    }

    #[test]
    fn ref_lines_names_only_with_empty_prefix() {
        let dir = TempDir::new().unwrap();
        let refs = seeded_refs(&dir);
        let lines = ref_lines(&refs.list_at("refs/tags").unwrap(), false, "");
        assert_eq!(lines, vec!["release/v2".to_string(), "v1".to_string()]);
    }

    #[test]
    fn resolve_name_accepts_full_hex() {
        let dir = TempDir::new().unwrap();
        let refs = RefDb::new(dir.path());
        let id = resolve_name(&refs, HASH_A).unwrap();
        assert_eq!(id.to_hex(), HASH_A);
    }

    #[test]
    fn resolve_name_tries_ref_prefixes() {
        let dir = TempDir::new().unwrap();
        let refs = seeded_refs(&dir);
        assert_eq!(resolve_name(&refs, "master").unwrap().to_hex(), HASH_A);
        assert_eq!(resolve_name(&refs, "v1").unwrap().to_hex(), HASH_B);
        assert_eq!(
            resolve_name(&refs, "refs/heads/master").unwrap().to_hex(),
            HASH_A
        );
    }

    #[test]
    fn resolve_name_unknown_is_an_error() {
        let dir = TempDir::new().unwrap();
        let refs = RefDb::new(dir.path());
        assert!(resolve_name(&refs, "no-such-name").is_err());
    }
}
