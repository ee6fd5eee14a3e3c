pub mod cat;
pub mod cp;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rename_dir;
pub mod rm;
pub mod rmdir;
pub mod url;
pub mod volume;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Manage configured volumes
    Volume(volume::VolumeArgs),
    /// List the contents of a folder
    Ls(ls::LsArgs),
    /// Print a file to stdout
    Cat(cat::CatArgs),
    /// Upload a local file into a volume
    Put(put::PutArgs),
    /// Copy a file within a volume
    Cp(cp::CpArgs),
    /// Move a file within a volume
    Mv(mv::MvArgs),
    /// Delete a file or folder
    Rm(rm::RmArgs),
    /// Delete a folder and its contents
    Rmdir(rmdir::RmdirArgs),
    /// Print the public URL of a file
    Url(url::UrlArgs),
    /// Create a folder
    Mkdir(mkdir::MkdirArgs),
    /// Rename a folder in place
    RenameDir(rename_dir::RenameDirArgs),
}
