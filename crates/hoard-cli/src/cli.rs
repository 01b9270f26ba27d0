use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hoard",
    about = "Content-addressable object store and plumbing commands",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new repository
    Init(InitArgs),
    /// Print the content or type of a stored object
    CatFile(CatFileArgs),
    /// Hash a file, optionally storing it as an object
    HashObject(HashObjectArgs),
    /// List the entries of a tree object
    LsTree(LsTreeArgs),
    /// Materialize a commit's tree into an empty directory
    Checkout(CheckoutArgs),
    /// List references with their resolved hashes
    ShowRef(ShowRefArgs),
    /// List tags, or create a lightweight or annotated tag
    Tag(TagArgs),
    /// List entries of the staging index
    LsFiles(LsFilesArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to create the repository (defaults to the current directory)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Hash or reference naming the object
    pub object: String,
    /// Print the object's type instead of its content
    #[arg(short = 't', long = "type")]
    pub show_type: bool,
}

#[derive(Args)]
pub struct HashObjectArgs {
    /// File to hash
    pub path: String,
    /// Object type to frame the content as
    #[arg(short = 't', long = "type", default_value = "blob")]
    pub object_type: String,
    /// Store the object instead of only printing its hash
    #[arg(short = 'w', long)]
    pub write: bool,
}

#[derive(Args)]
pub struct LsTreeArgs {
    /// Hash or reference naming the tree (or a commit whose tree is used)
    pub tree: String,
    /// Recurse into subtrees, printing leaf entries with full paths
    #[arg(short, long)]
    pub recursive: bool,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Hash or reference naming the commit to check out
    pub commit: String,
    /// Destination directory, which must be empty or absent
    pub path: String,
}

#[derive(Args)]
pub struct ShowRefArgs {}

#[derive(Args)]
pub struct TagArgs {
    /// Tag name; when absent, existing tags are listed
    pub name: Option<String>,
    /// Create an annotated tag object instead of a lightweight reference
    #[arg(short = 'a', long)]
    pub annotate: bool,
    /// Message for the annotated tag
    #[arg(short, long, default_value = "")]
    pub message: String,
    /// Tagger identity, e.g. "A U Thor <thor@example.com>"
    #[arg(long, default_value = "anonymous <anonymous@localhost>")]
    pub tagger: String,
}

#[derive(Args)]
pub struct LsFilesArgs {
    /// Print metadata for each entry, not just its name
    #[arg(short, long)]
    pub verbose: bool,
}
